//! Shared utilities, configuration, and error handling for the stock export service
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Request extractors
//! - Database handle lifecycle

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use db::{Database, DatabaseError};
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
