//! Common error types and handling for the stock export service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the stock export service
///
/// The string payload of each variant is the message returned to the
/// caller. Underlying causes are logged where they occur and never leak
/// into the response body.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Render(String),

    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    Dispatch(String),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unexpected(_)
            | Error::Database(_)
            | Error::Render(_)
            | Error::Persistence(_)
            | Error::Dispatch(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller
    pub fn public_message(&self) -> String {
        match self {
            Error::Unexpected(_) | Error::Database(_) => "Internal server error".to_string(),
            Error::Validation(msg)
            | Error::Render(msg)
            | Error::Persistence(msg)
            | Error::Dispatch(msg)
            | Error::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors with full context
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal server error");
        } else {
            tracing::debug!(error = %self, "Rejected request");
        }

        let body = Json(json!({ "error": self.public_message() }));

        (status, body).into_response()
    }
}
