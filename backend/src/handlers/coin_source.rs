use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use crate::error::AppError;
use super::AppJson;
use crate::models::{
    AddCoinRequest, CoinSourceConfig, CoinSourceResponse, DefaultApiUrls,
    UpdateCoinSourceRequest, DEFAULT_COIN_POOL_LIMIT, DEFAULT_OI_TOP_LIMIT,
    MAX_COIN_POOL_LIMIT, MAX_OI_TOP_LIMIT,
};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CoinSourceDefaultsResponse {
    #[serde(flatten)]
    pub urls: DefaultApiUrls,
    pub coin_pool_limit: u32,
    pub coin_pool_limit_max: u32,
    pub oi_top_limit: u32,
    pub oi_top_limit_max: u32,
}

/// GET /api/defaults - Default API URLs and limits for new configs
pub async fn get_coin_source_defaults(
    State(state): State<AppState>,
) -> Json<CoinSourceDefaultsResponse> {
    Json(CoinSourceDefaultsResponse {
        urls: state.coin_source_service.defaults().clone(),
        coin_pool_limit: DEFAULT_COIN_POOL_LIMIT,
        coin_pool_limit_max: MAX_COIN_POOL_LIMIT,
        oi_top_limit: DEFAULT_OI_TOP_LIMIT,
        oi_top_limit_max: MAX_OI_TOP_LIMIT,
    })
}

/// GET /api/coin-sources - List all stored coin sources
pub async fn list_coin_sources(
    State(state): State<AppState>,
) -> Json<Vec<CoinSourceResponse>> {
    let items = state.coin_source_service.list().await;
    Json(
        items
            .into_iter()
            .map(|(id, config)| CoinSourceResponse::new(id, config))
            .collect(),
    )
}

/// GET /api/coin-sources/:id
pub async fn get_coin_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<CoinSourceResponse> {
    let config = state.coin_source_service.get(&id).await;
    Json(CoinSourceResponse::new(id, config))
}

/// PUT /api/coin-sources/:id - Replace the whole config
pub async fn replace_coin_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(config): AppJson<CoinSourceConfig>,
) -> Result<Json<CoinSourceResponse>, AppError> {
    let config = state.coin_source_service.replace(&id, config).await?;
    Ok(Json(CoinSourceResponse::new(id, config)))
}

/// PATCH /api/coin-sources/:id - Change individual fields
pub async fn update_coin_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateCoinSourceRequest>,
) -> Result<Json<CoinSourceResponse>, AppError> {
    let config = state.coin_source_service.update(&id, req).await?;
    Ok(Json(CoinSourceResponse::new(id, config)))
}

/// DELETE /api/coin-sources/:id
pub async fn delete_coin_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.coin_source_service.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "Coin source deleted successfully",
        "strategy_id": id
    })))
}

/// POST /api/coin-sources/:id/coins - Add one symbol to the static list
pub async fn add_coin(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AddCoinRequest>,
) -> Result<Json<CoinSourceResponse>, AppError> {
    let config = state.coin_source_service.add_coin(&id, &req.symbol).await?;
    Ok(Json(CoinSourceResponse::new(id, config)))
}

/// DELETE /api/coin-sources/:id/coins/:symbol
pub async fn remove_coin(
    State(state): State<AppState>,
    Path((id, symbol)): Path<(String, String)>,
) -> Result<Json<CoinSourceResponse>, AppError> {
    let config = state.coin_source_service.remove_coin(&id, &symbol).await?;
    Ok(Json(CoinSourceResponse::new(id, config)))
}

/// POST /api/coin-sources/:id/defaults - Fill empty API URLs with defaults
pub async fn fill_coin_source_defaults(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CoinSourceResponse>, AppError> {
    let config = state.coin_source_service.fill_default_urls(&id).await?;
    Ok(Json(CoinSourceResponse::new(id, config)))
}
