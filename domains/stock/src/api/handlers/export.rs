//! Stock export API handler
//!
//! Implements:
//! - POST /export-stock: Render items to XLSX and email the file

use axum::{extract::State, Json};
use serde::Serialize;
use stockexport_common::{Error, Result, ValidatedJson};
use stockexport_email::{EmailAttachment, EmailError};

use crate::api::middleware::StockState;
use crate::domain::entities::ExportRequest;
use crate::domain::spreadsheet::{RenderError, RenderedDocument, XLSX_CONTENT_TYPE};
use crate::repository::ScratchError;

/// Acknowledgement returned after the email has been handed to the relay
pub const EXPORT_SUCCESS_MESSAGE: &str = "Stock exported and sent successfully";

/// Response shape for `POST /export-stock`
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub message: &'static str,
}

/// POST /export-stock: Render, persist, email, clean up
///
/// Each step aborts the pipeline on failure. The scratch file is removed
/// when `artifact` goes out of scope, on success and on every error path
/// after it was written.
pub async fn export_stock(
    State(state): State<StockState>,
    ValidatedJson(request): ValidatedJson<ExportRequest>,
) -> Result<Json<ExportResponse>> {
    tracing::info!(items = request.stock.len(), "Exporting stock");

    let document = RenderedDocument::render(&request.stock);
    let bytes = document.to_xlsx().map_err(render_error)?;

    let artifact = state.scratch.persist(&bytes).await.map_err(persistence_error)?;

    let attachment = EmailAttachment::from_path(artifact.path(), XLSX_CONTENT_TYPE)
        .await
        .map_err(dispatch_error)?;

    let receipt = state
        .email
        .send_stock_export(&request.email, attachment)
        .await
        .map_err(dispatch_error)?;

    tracing::info!(
        message_id = %receipt.message_id,
        provider = %receipt.provider,
        rows = document.row_count(),
        "Stock export sent"
    );

    Ok(Json(ExportResponse {
        message: EXPORT_SUCCESS_MESSAGE,
    }))
}

fn render_error(err: RenderError) -> Error {
    tracing::error!(error = %err, "Error generating Excel file");
    Error::Render("Failed to generate Excel file".to_string())
}

fn persistence_error(err: ScratchError) -> Error {
    tracing::error!(error = %err, "Error persisting export file");
    match err {
        ScratchError::CreateDir { .. } => {
            Error::Persistence("Failed to create temp directory".to_string())
        }
        ScratchError::Write { .. } => Error::Persistence("Failed to save Excel file".to_string()),
    }
}

fn dispatch_error(err: EmailError) -> Error {
    tracing::error!(error = %err, "Error sending export email");
    Error::Dispatch("Failed to send email".to_string())
}
