use std::env;
use crate::error::AppError;
use crate::models::DefaultApiUrls;

const DEFAULT_COIN_POOL_API_URL: &str = "http://nofxaios.com:30006/api/ai500/list";
const DEFAULT_OI_TOP_API_URL: &str = "http://nofxaios.com:30006/api/oi/top-ranking?limit=20&duration=1h";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    // Offered by "fill default"; never fetched by this service
    pub coin_pool_api_url: String,
    pub oi_top_api_url: String,
    // CORS configuration
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        // Try to load .env from current directory first, then parent
        if dotenvy::dotenv().is_err() {
            // Useful when running from backend/ subdir
            let _ = dotenvy::from_path(std::path::Path::new("../.env"));
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server_port = match get("SERVER_PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("SERVER_PORT must be a number, got {:?}", port)))?,
            None => 3002,
        };

        Ok(Self {
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            coin_pool_api_url: get("COIN_POOL_API_URL")
                .unwrap_or_else(|| DEFAULT_COIN_POOL_API_URL.to_string()),
            oi_top_api_url: get("OI_TOP_API_URL")
                .unwrap_or_else(|| DEFAULT_OI_TOP_API_URL.to_string()),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn default_api_urls(&self) -> DefaultApiUrls {
        DefaultApiUrls {
            coin_pool_api_url: self.coin_pool_api_url.clone(),
            oi_top_api_url: self.oi_top_api_url.clone(),
        }
    }
}
