//! Stock export application composition root
//!
//! Composes the domain router with shared infrastructure routes and layers.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use stockexport_common::{Config, Database};
use stockexport_email::{EmailConfig, EmailServiceFactory};
use stockexport_stock::{ScratchDir, StockState};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Build domain state from configuration and an already connected database
pub fn build_state(config: &Config, db: Database) -> Result<StockState, anyhow::Error> {
    let email_config = EmailConfig::from_env()?;
    let email_service = EmailServiceFactory::create(email_config)?;

    Ok(StockState {
        email: Arc::from(email_service),
        scratch: ScratchDir::new(config.temp_dir.clone()),
        db,
    })
}

/// Create the main application router with all routes
pub fn create_app(state: StockState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async {
                concat!("Stock Export API v", env!("CARGO_PKG_VERSION"))
            }),
        )
        .merge(stockexport_stock::routes().with_state(state))
}

/// CORS for a single browser origin with credentials
pub fn build_cors_layer(origin: &str) -> Result<CorsLayer, anyhow::Error> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin {}: {}", origin, e))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_credentials(true)
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
        ]))
}

pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
