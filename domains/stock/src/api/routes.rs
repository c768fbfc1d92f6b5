//! Route definitions for the stock export API

use axum::{routing::post, Router};

use super::handlers::export;
use super::middleware::StockState;

/// Create all stock export routes
pub fn routes() -> Router<StockState> {
    Router::new().route("/export-stock", post(export::export_stock))
}
