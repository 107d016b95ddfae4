mod config;
mod error;
mod handlers;
mod models;
mod services;

use axum::{
    routing::{get, post},
    Router, Json,
    extract::State,
    http::{header, HeaderValue, Method},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use services::CoinSourceService;

#[derive(Clone)]
pub struct AppState {
    pub coin_source_service: CoinSourceService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            coin_source_service: CoinSourceService::new(config.default_api_urls()),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Coin Source Backend Starting...");

    // Load configuration
    let config = Config::from_env()?;
    let addr = config.server_addr();
    tracing::info!("🔗 Default coin pool API: {}", config.coin_pool_api_url);
    tracing::info!("🔗 Default OI top API: {}", config.oi_top_api_url);

    let app = build_router(AppState::new(config));

    tracing::info!("🚀 Coin Source Backend starting on http://{}", addr);
    tracing::info!("📊 API available at http://{}/api", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_origins(allowed: &[String]) -> AllowOrigin {
    if allowed.iter().any(|origin| origin == "*") {
        return AllowOrigin::any();
    }
    let origins: Vec<HeaderValue> = allowed
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("⚠️ Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();
    AllowOrigin::list(origins)
}

pub fn build_router(state: AppState) -> Router {
    let origins = cors_origins(&state.config.cors_allowed_origins);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/api/status", get(system_status))

        // Symbol routes
        .route("/api/symbols/normalize", post(handlers::normalize_symbols))
        .route("/api/symbols/xyz", get(handlers::get_xyz_assets))

        // Coin source routes
        .route("/api/defaults", get(handlers::get_coin_source_defaults))
        .route("/api/coin-sources", get(handlers::list_coin_sources))
        .route(
            "/api/coin-sources/:id",
            get(handlers::get_coin_source)
                .put(handlers::replace_coin_source)
                .patch(handlers::update_coin_source)
                .delete(handlers::delete_coin_source),
        )
        .route("/api/coin-sources/:id/coins", post(handlers::add_coin))
        .route("/api/coin-sources/:id/coins/:symbol", axum::routing::delete(handlers::remove_coin))
        .route("/api/coin-sources/:id/defaults", post(handlers::fill_coin_source_defaults))

        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/status - Service status and stored coin source count
async fn system_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "coin_sources": state.coin_source_service.count().await,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
