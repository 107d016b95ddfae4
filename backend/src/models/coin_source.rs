use serde::{Deserialize, Deserializer, Serialize};
use crate::services::symbols;

pub const DEFAULT_COIN_POOL_LIMIT: u32 = 10;
pub const MAX_COIN_POOL_LIMIT: u32 = 100;
pub const DEFAULT_OI_TOP_LIMIT: u32 = 20;
pub const MAX_OI_TOP_LIMIT: u32 = 50;

/// How a strategy obtains its list of tradable symbols
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Static,
    #[serde(rename = "coinpool")]
    CoinPool,
    OiTop,
    Mixed,
}

impl SourceType {
    pub fn uses_coin_pool(&self) -> bool {
        matches!(self, SourceType::CoinPool | SourceType::Mixed)
    }

    pub fn uses_oi_top(&self) -> bool {
        matches!(self, SourceType::OiTop | SourceType::Mixed)
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Static => write!(f, "static"),
            SourceType::CoinPool => write!(f, "coinpool"),
            SourceType::OiTop => write!(f, "oi_top"),
            SourceType::Mixed => write!(f, "mixed"),
        }
    }
}

/// External source that is fetched from a configured URL
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExternalSource {
    #[serde(rename = "coinpool")]
    CoinPool,
    OiTop,
}

/// Non-blocking problems with a configuration. Saving is still allowed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    /// An enabled source has no API URL, so no data can be fetched for it
    MissingApiUrl { source: ExternalSource },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingApiUrl { source: ExternalSource::CoinPool } => {
                write!(f, "coin pool API URL required to fetch data")
            }
            ConfigWarning::MissingApiUrl { source: ExternalSource::OiTop } => {
                write!(f, "OI top API URL required to fetch data")
            }
        }
    }
}

/// Default API endpoints offered by "fill default"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultApiUrls {
    pub coin_pool_api_url: String,
    pub oi_top_api_url: String,
}

/// Coin source configuration of a strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoinSourceConfig {
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub static_coins: Vec<String>,
    #[serde(default)]
    pub use_coin_pool: bool,
    #[serde(default = "default_coin_pool_limit", deserialize_with = "deserialize_coin_pool_limit")]
    pub coin_pool_limit: u32,
    #[serde(default)]
    pub coin_pool_api_url: String,
    #[serde(default)]
    pub use_oi_top: bool,
    #[serde(default = "default_oi_top_limit", deserialize_with = "deserialize_oi_top_limit")]
    pub oi_top_limit: u32,
    #[serde(default)]
    pub oi_top_api_url: String,
}

fn default_coin_pool_limit() -> u32 { DEFAULT_COIN_POOL_LIMIT }
fn default_oi_top_limit() -> u32 { DEFAULT_OI_TOP_LIMIT }

/// Zero falls back to the default, anything else is clamped into `1..=max`
fn clamp_limit(raw: i64, default: u32, max: u32) -> u32 {
    if raw == 0 {
        default
    } else {
        raw.clamp(1, i64::from(max)) as u32
    }
}

pub fn clamp_coin_pool_limit(limit: u32) -> u32 {
    clamp_limit(i64::from(limit), DEFAULT_COIN_POOL_LIMIT, MAX_COIN_POOL_LIMIT)
}

pub fn clamp_oi_top_limit(limit: u32) -> u32 {
    clamp_limit(i64::from(limit), DEFAULT_OI_TOP_LIMIT, MAX_OI_TOP_LIMIT)
}

/// Leading integer of a string, parseInt style: "15.5" -> 15, "30abc" -> 30, "abc" -> None.
/// Overlong digit runs saturate.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    Some(sign * digits[..end].parse::<i64>().unwrap_or(i64::MAX))
}

/// Limits arrive from form inputs as numbers, numeric strings, or garbage.
/// `None` means null or nothing parsable.
fn parse_limit<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let limit = match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => parse_int_prefix(&s),
        _ => None,
    };
    Ok(limit)
}

fn deserialize_coin_pool_limit<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = parse_limit(deserializer)?.unwrap_or(0);
    Ok(clamp_limit(raw, DEFAULT_COIN_POOL_LIMIT, MAX_COIN_POOL_LIMIT))
}

fn deserialize_oi_top_limit<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = parse_limit(deserializer)?.unwrap_or(0);
    Ok(clamp_limit(raw, DEFAULT_OI_TOP_LIMIT, MAX_OI_TOP_LIMIT))
}

impl Default for CoinSourceConfig {
    fn default() -> Self {
        Self {
            source_type: SourceType::Static,
            static_coins: Vec::new(),
            use_coin_pool: false,
            coin_pool_limit: DEFAULT_COIN_POOL_LIMIT,
            coin_pool_api_url: String::new(),
            use_oi_top: false,
            oi_top_limit: DEFAULT_OI_TOP_LIMIT,
            oi_top_api_url: String::new(),
        }
    }
}

impl CoinSourceConfig {
    pub fn with_source_type(self, source_type: SourceType) -> Self {
        Self { source_type, ..self }
    }

    pub fn with_coin_pool_enabled(self, use_coin_pool: bool) -> Self {
        Self { use_coin_pool, ..self }
    }

    pub fn with_coin_pool_limit(self, limit: u32) -> Self {
        Self { coin_pool_limit: clamp_coin_pool_limit(limit), ..self }
    }

    pub fn with_coin_pool_api_url(self, url: impl Into<String>) -> Self {
        Self { coin_pool_api_url: url.into(), ..self }
    }

    pub fn with_oi_top_enabled(self, use_oi_top: bool) -> Self {
        Self { use_oi_top, ..self }
    }

    pub fn with_oi_top_limit(self, limit: u32) -> Self {
        Self { oi_top_limit: clamp_oi_top_limit(limit), ..self }
    }

    pub fn with_oi_top_api_url(self, url: impl Into<String>) -> Self {
        Self { oi_top_api_url: url.into(), ..self }
    }

    /// Normalize `raw` and append it unless it is already listed.
    /// Blank input leaves the config unchanged.
    pub fn with_coin(mut self, raw: &str) -> Self {
        if let Some(symbol) = symbols::normalize_input(raw) {
            if !self.static_coins.contains(&symbol) {
                self.static_coins.push(symbol);
            }
        }
        self
    }

    /// Remove every exact occurrence of `symbol`
    pub fn without_coin(mut self, symbol: &str) -> Self {
        self.static_coins.retain(|c| c != symbol);
        self
    }

    /// Fill empty API URLs with the given defaults
    pub fn with_default_urls(self, defaults: &DefaultApiUrls) -> Self {
        let coin_pool_api_url = if self.coin_pool_api_url.is_empty() {
            defaults.coin_pool_api_url.clone()
        } else {
            self.coin_pool_api_url.clone()
        };
        let oi_top_api_url = if self.oi_top_api_url.is_empty() {
            defaults.oi_top_api_url.clone()
        } else {
            self.oi_top_api_url.clone()
        };
        Self { coin_pool_api_url, oi_top_api_url, ..self }
    }

    /// Canonicalize every static coin, drop blanks and keep the first of each duplicate.
    /// Limits are clamped into range.
    pub fn normalized(self) -> Self {
        let mut static_coins: Vec<String> = Vec::with_capacity(self.static_coins.len());
        for raw in &self.static_coins {
            if let Some(symbol) = symbols::normalize_input(raw) {
                if !static_coins.contains(&symbol) {
                    static_coins.push(symbol);
                }
            }
        }
        Self {
            coin_pool_limit: clamp_coin_pool_limit(self.coin_pool_limit),
            oi_top_limit: clamp_oi_top_limit(self.oi_top_limit),
            static_coins,
            ..self
        }
    }

    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.source_type.uses_coin_pool() && self.use_coin_pool && self.coin_pool_api_url.trim().is_empty() {
            warnings.push(ConfigWarning::MissingApiUrl { source: ExternalSource::CoinPool });
        }
        if self.source_type.uses_oi_top() && self.use_oi_top && self.oi_top_api_url.trim().is_empty() {
            warnings.push(ConfigWarning::MissingApiUrl { source: ExternalSource::OiTop });
        }
        warnings
    }
}

/// Partial update of a coin source config
#[derive(Debug, Deserialize, Default)]
pub struct UpdateCoinSourceRequest {
    pub source_type: Option<SourceType>,
    pub use_coin_pool: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_limit")]
    pub coin_pool_limit: Option<i64>,
    pub coin_pool_api_url: Option<String>,
    pub use_oi_top: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_limit")]
    pub oi_top_limit: Option<i64>,
    pub oi_top_api_url: Option<String>,
}

/// Null counts as absent. Anything else present but unparsable is zero, so it resets to the default.
fn deserialize_optional_limit<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let raw = parse_limit(value).map_err(serde::de::Error::custom)?;
    Ok(Some(raw.unwrap_or(0)))
}

impl UpdateCoinSourceRequest {
    pub fn is_empty(&self) -> bool {
        self.source_type.is_none()
            && self.use_coin_pool.is_none()
            && self.coin_pool_limit.is_none()
            && self.coin_pool_api_url.is_none()
            && self.use_oi_top.is_none()
            && self.oi_top_limit.is_none()
            && self.oi_top_api_url.is_none()
    }

    pub fn apply(self, config: CoinSourceConfig) -> CoinSourceConfig {
        let mut config = config;
        if let Some(source_type) = self.source_type {
            config = config.with_source_type(source_type);
        }
        if let Some(enabled) = self.use_coin_pool {
            config = config.with_coin_pool_enabled(enabled);
        }
        if let Some(raw) = self.coin_pool_limit {
            config = config.with_coin_pool_limit(clamp_limit(raw, DEFAULT_COIN_POOL_LIMIT, MAX_COIN_POOL_LIMIT));
        }
        if let Some(url) = self.coin_pool_api_url {
            config = config.with_coin_pool_api_url(url);
        }
        if let Some(enabled) = self.use_oi_top {
            config = config.with_oi_top_enabled(enabled);
        }
        if let Some(raw) = self.oi_top_limit {
            config = config.with_oi_top_limit(clamp_limit(raw, DEFAULT_OI_TOP_LIMIT, MAX_OI_TOP_LIMIT));
        }
        if let Some(url) = self.oi_top_api_url {
            config = config.with_oi_top_api_url(url);
        }
        config
    }
}

#[derive(Debug, Deserialize)]
pub struct AddCoinRequest {
    pub symbol: String,
}

/// Stored config together with its current warnings
#[derive(Debug, Clone, Serialize)]
pub struct CoinSourceResponse {
    pub strategy_id: String,
    pub config: CoinSourceConfig,
    pub warnings: Vec<ConfigWarning>,
}

impl CoinSourceResponse {
    pub fn new(strategy_id: impl Into<String>, config: CoinSourceConfig) -> Self {
        let warnings = config.warnings();
        Self {
            strategy_id: strategy_id.into(),
            config,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: CoinSourceConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, CoinSourceConfig::default());
    }

    #[test]
    fn test_source_type_wire_names() {
        let config: CoinSourceConfig = serde_json::from_value(json!({"source_type": "coinpool"})).unwrap();
        assert_eq!(config.source_type, SourceType::CoinPool);
        let config: CoinSourceConfig = serde_json::from_value(json!({"source_type": "oi_top"})).unwrap();
        assert_eq!(config.source_type, SourceType::OiTop);
        assert_eq!(serde_json::to_value(SourceType::Mixed).unwrap(), json!("mixed"));
        assert_eq!(SourceType::CoinPool.to_string(), "coinpool");
    }

    #[test]
    fn test_limit_parsing_falls_back_and_clamps() {
        let config: CoinSourceConfig = serde_json::from_value(json!({
            "coin_pool_limit": "abc",
            "oi_top_limit": 500,
        }))
        .unwrap();
        assert_eq!(config.coin_pool_limit, DEFAULT_COIN_POOL_LIMIT);
        assert_eq!(config.oi_top_limit, MAX_OI_TOP_LIMIT);

        let config: CoinSourceConfig = serde_json::from_value(json!({
            "coin_pool_limit": "42",
            "oi_top_limit": 0,
        }))
        .unwrap();
        assert_eq!(config.coin_pool_limit, 42);
        assert_eq!(config.oi_top_limit, DEFAULT_OI_TOP_LIMIT);
    }

    #[test]
    fn test_limit_strings_use_leading_integer() {
        let config: CoinSourceConfig = serde_json::from_value(json!({
            "coin_pool_limit": "15.5",
            "oi_top_limit": "30abc",
        }))
        .unwrap();
        assert_eq!(config.coin_pool_limit, 15);
        assert_eq!(config.oi_top_limit, 30);

        let config: CoinSourceConfig = serde_json::from_value(json!({
            "coin_pool_limit": " 7 items",
            "oi_top_limit": "99999999999999999999999",
        }))
        .unwrap();
        assert_eq!(config.coin_pool_limit, 7);
        assert_eq!(config.oi_top_limit, MAX_OI_TOP_LIMIT);
    }

    #[test]
    fn test_negative_limits_clamp_to_minimum() {
        let config: CoinSourceConfig = serde_json::from_value(json!({
            "coin_pool_limit": -5,
            "oi_top_limit": "-12",
        }))
        .unwrap();
        assert_eq!(config.coin_pool_limit, 1);
        assert_eq!(config.oi_top_limit, 1);

        let config: CoinSourceConfig = serde_json::from_value(json!({"coin_pool_limit": 2.9})).unwrap();
        assert_eq!(config.coin_pool_limit, 2);
    }

    #[test]
    fn test_update_request_null_limit_is_absent() {
        let req: UpdateCoinSourceRequest = serde_json::from_value(json!({
            "coin_pool_limit": null,
            "oi_top_limit": -3,
        }))
        .unwrap();
        assert_eq!(req.coin_pool_limit, None);

        let config = req.apply(CoinSourceConfig::default().with_coin_pool_limit(42));
        assert_eq!(config.coin_pool_limit, 42);
        assert_eq!(config.oi_top_limit, 1);

        let req: UpdateCoinSourceRequest = serde_json::from_value(json!({"coin_pool_limit": null})).unwrap();
        assert!(req.is_empty());
    }

    #[test]
    fn test_with_coin_normalizes_and_dedups() {
        let config = CoinSourceConfig::default()
            .with_coin("btc")
            .with_coin("BTCUSDT")
            .with_coin("tsla")
            .with_coin("xyz:TSLA")
            .with_coin("   ");
        assert_eq!(config.static_coins, vec!["BTCUSDT", "xyz:TSLA"]);
    }

    #[test]
    fn test_without_coin_removes_all_exact_matches() {
        let config = CoinSourceConfig {
            static_coins: vec![
                "BTCUSDT".to_string(),
                "ETHUSDT".to_string(),
                "BTCUSDT".to_string(),
                "btcusdt".to_string(),
            ],
            ..Default::default()
        };
        let config = config.without_coin("BTCUSDT");
        assert_eq!(config.static_coins, vec!["ETHUSDT", "btcusdt"]);
    }

    #[test]
    fn test_copy_update_changes_one_field() {
        let base = CoinSourceConfig::default();
        let updated = base.clone().with_oi_top_limit(30);
        assert_eq!(updated.oi_top_limit, 30);
        assert_eq!(CoinSourceConfig { oi_top_limit: 30, ..base }, updated);
        assert_eq!(CoinSourceConfig::default().with_coin_pool_limit(1000).coin_pool_limit, MAX_COIN_POOL_LIMIT);
    }

    #[test]
    fn test_with_default_urls_keeps_existing() {
        let defaults = DefaultApiUrls {
            coin_pool_api_url: "http://pool.example/list".to_string(),
            oi_top_api_url: "http://oi.example/top".to_string(),
        };
        let config = CoinSourceConfig::default()
            .with_oi_top_api_url("http://custom/oi")
            .with_default_urls(&defaults);
        assert_eq!(config.coin_pool_api_url, "http://pool.example/list");
        assert_eq!(config.oi_top_api_url, "http://custom/oi");
    }

    #[test]
    fn test_warnings_only_for_active_enabled_sources() {
        let config = CoinSourceConfig::default()
            .with_coin_pool_enabled(true)
            .with_oi_top_enabled(true);
        // Static mode ignores both external sources
        assert!(config.warnings().is_empty());

        let config = config.with_source_type(SourceType::CoinPool);
        assert_eq!(
            config.warnings(),
            vec![ConfigWarning::MissingApiUrl { source: ExternalSource::CoinPool }]
        );

        let config = config
            .with_source_type(SourceType::Mixed)
            .with_coin_pool_api_url("http://pool");
        assert_eq!(
            config.warnings(),
            vec![ConfigWarning::MissingApiUrl { source: ExternalSource::OiTop }]
        );
    }

    #[test]
    fn test_normalized_cleans_static_coins() {
        let config = CoinSourceConfig {
            static_coins: vec![
                "eth".to_string(),
                "".to_string(),
                "ETHUSDT".to_string(),
                "gold".to_string(),
            ],
            coin_pool_limit: 0,
            oi_top_limit: 99,
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.static_coins, vec!["ETHUSDT", "xyz:GOLD"]);
        assert_eq!(config.coin_pool_limit, DEFAULT_COIN_POOL_LIMIT);
        assert_eq!(config.oi_top_limit, MAX_OI_TOP_LIMIT);
    }

    #[test]
    fn test_update_request_applies_present_fields() {
        let req: UpdateCoinSourceRequest = serde_json::from_value(json!({
            "source_type": "mixed",
            "use_oi_top": true,
            "oi_top_limit": "15",
        }))
        .unwrap();
        assert!(!req.is_empty());
        let config = req.apply(CoinSourceConfig::default().with_coin("sol"));
        assert_eq!(config.source_type, SourceType::Mixed);
        assert!(config.use_oi_top);
        assert_eq!(config.oi_top_limit, 15);
        assert_eq!(config.coin_pool_limit, DEFAULT_COIN_POOL_LIMIT);
        assert_eq!(config.static_coins, vec!["SOLUSDT"]);
    }

    #[test]
    fn test_warning_serialization() {
        let warning = ConfigWarning::MissingApiUrl { source: ExternalSource::OiTop };
        assert_eq!(
            serde_json::to_value(&warning).unwrap(),
            json!({"kind": "missing_api_url", "source": "oi_top"})
        );
    }
}
