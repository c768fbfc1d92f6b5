//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Email relay settings live in
//! `stockexport_email::EmailConfig`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default scratch directory for generated spreadsheets, relative to the
/// working directory
pub const DEFAULT_TEMP_DIR: &str = "temp";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,

    /// Optional database name override; falls back to the name in the URL
    pub database_name: Option<String>,

    /// Single origin allowed by the CORS layer
    pub cors_origin: String,

    /// Scratch directory for export files
    pub temp_dir: PathBuf,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,
            database_name: env::var("DB_NAME").ok().filter(|name| !name.is_empty()),

            cors_origin: env::var("ORIGIN").map_err(|_| anyhow::anyhow!("ORIGIN is required"))?,

            temp_dir: env::var("EXPORT_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TEMP_DIR)),

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "stockexport=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        };

        Ok(config)
    }
}

/// Load a `.env` file unless running on the hosted platform, which injects
/// variables directly and sets `RENDER`.
pub fn load_dotenv() {
    if env::var("RENDER").is_err() && dotenvy::dotenv().is_err() {
        tracing::debug!("No .env file found, using process environment only");
    }
}
