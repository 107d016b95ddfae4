//! In-memory store of per-strategy coin source configurations

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::error::AppError;
use crate::models::{CoinSourceConfig, DefaultApiUrls, UpdateCoinSourceRequest};
use crate::services::symbols;

#[derive(Clone)]
pub struct CoinSourceService {
    defaults: DefaultApiUrls,
    cache: Arc<RwLock<HashMap<String, CoinSourceConfig>>>,
}

impl CoinSourceService {
    pub fn new(defaults: DefaultApiUrls) -> Self {
        Self {
            defaults,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn defaults(&self) -> &DefaultApiUrls {
        &self.defaults
    }

    /// Get the config for a strategy, or the default config if none is stored
    pub async fn get(&self, strategy_id: &str) -> CoinSourceConfig {
        let cache = self.cache.read().await;
        cache.get(strategy_id).cloned().unwrap_or_default()
    }

    /// List all stored configs sorted by strategy id
    pub async fn list(&self) -> Vec<(String, CoinSourceConfig)> {
        let cache = self.cache.read().await;
        let mut items: Vec<(String, CoinSourceConfig)> = cache
            .iter()
            .map(|(id, config)| (id.clone(), config.clone()))
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        items
    }

    pub async fn count(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Replace the whole config. Static coins are re-normalized.
    pub async fn replace(&self, strategy_id: &str, config: CoinSourceConfig) -> Result<CoinSourceConfig, AppError> {
        validate_strategy_id(strategy_id)?;
        let config = config.normalized();
        self.store(strategy_id, config.clone()).await;
        tracing::info!("💾 Saved coin source for {} ({}, {} static coins)", strategy_id, config.source_type, config.static_coins.len());
        Ok(config)
    }

    /// Apply a partial update on top of the current config
    pub async fn update(&self, strategy_id: &str, req: UpdateCoinSourceRequest) -> Result<CoinSourceConfig, AppError> {
        validate_strategy_id(strategy_id)?;
        if req.is_empty() {
            return Err(AppError::BadRequest("update contains no fields".to_string()));
        }
        self.modify(strategy_id, |config| req.apply(config)).await
    }

    /// Add a symbol to the static list. Blank input is rejected.
    pub async fn add_coin(&self, strategy_id: &str, raw: &str) -> Result<CoinSourceConfig, AppError> {
        validate_strategy_id(strategy_id)?;
        let symbol = symbols::normalize_input(raw)
            .ok_or_else(|| AppError::BadRequest("symbol is required".to_string()))?;
        tracing::debug!("➕ Adding {} (from {:?}) to {}", symbol, raw, strategy_id);
        self.modify(strategy_id, |config| config.with_coin(&symbol)).await
    }

    /// Remove a symbol from the static list. The strategy must already exist.
    pub async fn remove_coin(&self, strategy_id: &str, symbol: &str) -> Result<CoinSourceConfig, AppError> {
        validate_strategy_id(strategy_id)?;
        tracing::debug!("➖ Removing {} from {}", symbol, strategy_id);
        self.modify_existing(strategy_id, |config| config.without_coin(symbol)).await
    }

    /// Fill empty API URLs with the configured defaults. The strategy must already exist.
    pub async fn fill_default_urls(&self, strategy_id: &str) -> Result<CoinSourceConfig, AppError> {
        validate_strategy_id(strategy_id)?;
        let defaults = self.defaults.clone();
        self.modify_existing(strategy_id, |config| config.with_default_urls(&defaults)).await
    }

    pub async fn delete(&self, strategy_id: &str) -> Result<(), AppError> {
        let mut cache = self.cache.write().await;
        match cache.remove(strategy_id) {
            Some(_) => {
                tracing::info!("🗑️ Deleted coin source for {}", strategy_id);
                Ok(())
            }
            None => Err(AppError::NotFound(format!("No coin source for strategy {}", strategy_id))),
        }
    }

    async fn modify<F>(&self, strategy_id: &str, f: F) -> Result<CoinSourceConfig, AppError>
    where
        F: FnOnce(CoinSourceConfig) -> CoinSourceConfig,
    {
        let mut cache = self.cache.write().await;
        let current = cache.remove(strategy_id).unwrap_or_default();
        let updated = f(current);
        log_warnings(strategy_id, &updated);
        cache.insert(strategy_id.to_string(), updated.clone());
        Ok(updated)
    }

    /// Like `modify`, but never creates a record for an unknown strategy
    async fn modify_existing<F>(&self, strategy_id: &str, f: F) -> Result<CoinSourceConfig, AppError>
    where
        F: FnOnce(CoinSourceConfig) -> CoinSourceConfig,
    {
        let mut cache = self.cache.write().await;
        let entry = cache
            .get_mut(strategy_id)
            .ok_or_else(|| AppError::NotFound(format!("No coin source for strategy {}", strategy_id)))?;
        let updated = f(std::mem::take(entry));
        log_warnings(strategy_id, &updated);
        *entry = updated.clone();
        Ok(updated)
    }

    async fn store(&self, strategy_id: &str, config: CoinSourceConfig) {
        log_warnings(strategy_id, &config);
        let mut cache = self.cache.write().await;
        cache.insert(strategy_id.to_string(), config);
    }
}

fn validate_strategy_id(strategy_id: &str) -> Result<(), AppError> {
    if strategy_id.trim().is_empty() {
        return Err(AppError::BadRequest("strategy_id is required".to_string()));
    }
    Ok(())
}

fn log_warnings(strategy_id: &str, config: &CoinSourceConfig) {
    for warning in config.warnings() {
        tracing::warn!("⚠️ Coin source for {}: {}", strategy_id, warning);
    }
}
