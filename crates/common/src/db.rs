//! Database handle lifecycle
//!
//! The pool is built once at startup and handed to request state. No
//! exported handler queries through it yet.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use thiserror::Error;

use crate::error::Error;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Database-specific error types
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidUrl(String),

    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),
}

impl From<DatabaseError> for Error {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::InvalidUrl(msg) => Error::Internal(msg),
            DatabaseError::Connection(e) => Error::Database(e),
        }
    }
}

/// Explicitly constructed database dependency
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect and verify the connection with a ping
    pub async fn connect(url: &str, database_name: Option<&str>) -> Result<Self, DatabaseError> {
        let options = connect_options(url, database_name)?;

        let pool = PgPoolOptions::new()
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_with(options)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        tracing::info!("Connected to database");
        Ok(Self { pool })
    }

    /// Build a pool that opens connections on first use
    pub fn connect_lazy(url: &str, database_name: Option<&str>) -> Result<Self, DatabaseError> {
        let options = connect_options(url, database_name)?;
        let pool = PgPoolOptions::new()
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_lazy_with(options);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all connections; call once after the server stops
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connections closed");
    }
}

fn connect_options(url: &str, database_name: Option<&str>) -> Result<PgConnectOptions, DatabaseError> {
    let options =
        PgConnectOptions::from_str(url).map_err(|e| DatabaseError::InvalidUrl(e.to_string()))?;
    Ok(match database_name {
        Some(name) => options.database(name),
        None => options,
    })
}
