//! Stock export domain state

use std::sync::Arc;

use stockexport_common::Database;
use stockexport_email::EmailService;

use crate::repository::ScratchDir;

/// Application state for the stock export domain
#[derive(Clone)]
pub struct StockState {
    pub email: Arc<dyn EmailService>,
    pub scratch: ScratchDir,
    /// Injected at startup; no export path queries it
    pub db: Database,
}
