//! Symbol normalization for strategy coin lists
//!
//! Perpetual contracts are addressed as `<BASE>USDT`. Assets listed on the xyz dex
//! (stocks, forex, commodities, index) are addressed as `xyz:<BASE>` instead.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Namespace prefix used for xyz dex assets in canonical form
pub const XYZ_PREFIX: &str = "xyz:";

/// Quote suffix appended to perpetual symbols
pub const PERP_QUOTE: &str = "USDT";

/// Quote suffixes stripped from xyz dex input, in precedence order
const QUOTE_SUFFIXES: [&str; 3] = ["USDT", "USD", "-USDC"];

/// xyz dex assets (stocks, forex, commodities) - should NOT get USDT suffix
static XYZ_DEX_ASSETS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        // Stocks
        "TSLA", "NVDA", "AAPL", "MSFT", "META", "AMZN", "GOOGL", "AMD", "COIN", "NFLX",
        "PLTR", "HOOD", "INTC", "MSTR", "TSM", "ORCL", "MU", "RIVN", "COST", "LLY",
        "CRCL", "SKHX", "SNDK",
        // Forex
        "EUR", "JPY",
        // Commodities
        "GOLD", "SILVER",
        // Index
        "XYZ100",
    ])
});

/// Which addressing scheme a symbol belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    XyzDex,
    Perpetual,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::XyzDex => write!(f, "xyz_dex"),
            AssetClass::Perpetual => write!(f, "perpetual"),
        }
    }
}

/// Strip a leading `xyz:` prefix, ignoring case
fn strip_xyz_prefix(symbol: &str) -> &str {
    match symbol.get(..XYZ_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(XYZ_PREFIX) => &symbol[XYZ_PREFIX.len()..],
        _ => symbol,
    }
}

/// Strip at most one quote suffix, first match wins
fn strip_quote_suffix(symbol: &str) -> &str {
    QUOTE_SUFFIXES
        .iter()
        .find_map(|suffix| symbol.strip_suffix(suffix))
        .unwrap_or(symbol)
}

/// Base token of an uppercased symbol: no namespace prefix, no quote suffix
fn base_token(upper: &str) -> &str {
    strip_quote_suffix(strip_xyz_prefix(upper))
}

/// Check whether a symbol refers to an xyz dex asset.
/// Case, an `xyz:` prefix and a USDT/USD/-USDC suffix are all ignored.
pub fn is_xyz_dex_asset(symbol: &str) -> bool {
    let upper = symbol.to_uppercase();
    XYZ_DEX_ASSETS.contains(base_token(&upper))
}

pub fn classify(symbol: &str) -> AssetClass {
    if is_xyz_dex_asset(symbol) {
        AssetClass::XyzDex
    } else {
        AssetClass::Perpetual
    }
}

/// Produce the canonical form of a symbol.
///
/// Callers must reject empty input first; see [`normalize_input`].
pub fn canonicalize(symbol: &str) -> String {
    let upper = symbol.trim().to_uppercase();

    if is_xyz_dex_asset(&upper) {
        format!("{}{}", XYZ_PREFIX, base_token(&upper))
    } else if upper.ends_with(PERP_QUOTE) {
        upper
    } else {
        format!("{}{}", upper, PERP_QUOTE)
    }
}

/// Canonicalize free-form user input, ignoring blank entries
pub fn normalize_input(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    Some(canonicalize(raw))
}

/// All xyz dex base tokens, sorted
pub fn xyz_dex_assets() -> Vec<&'static str> {
    let mut assets: Vec<&'static str> = XYZ_DEX_ASSETS.iter().copied().collect();
    assets.sort_unstable();
    assets
}
