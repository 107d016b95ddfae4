//! Symbol normalization endpoints

use axum::Json;
use serde::{Deserialize, Serialize};
use crate::error::AppError;
use super::AppJson;
use crate::services::symbols::{self, AssetClass};

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedSymbol {
    pub input: String,
    pub symbol: String,
    pub asset_class: AssetClass,
}

/// POST /api/symbols/normalize - Canonicalize a batch of raw symbols
pub async fn normalize_symbols(
    AppJson(req): AppJson<NormalizeRequest>,
) -> Result<Json<Vec<NormalizedSymbol>>, AppError> {
    if req.symbols.is_empty() {
        return Err(AppError::BadRequest("symbols cannot be empty".to_string()));
    }

    // Blank entries are skipped, matching the editor's no-op add
    let normalized: Vec<NormalizedSymbol> = req
        .symbols
        .into_iter()
        .filter_map(|input| {
            let symbol = symbols::normalize_input(&input)?;
            let asset_class = symbols::classify(&symbol);
            Some(NormalizedSymbol { input, symbol, asset_class })
        })
        .collect();

    tracing::debug!("🔤 Normalized {} symbols", normalized.len());
    Ok(Json(normalized))
}

/// GET /api/symbols/xyz - Base tokens that use the xyz: namespace
pub async fn get_xyz_assets() -> Json<Vec<&'static str>> {
    Json(symbols::xyz_dex_assets())
}
