//! Shared email content
//!
//! Canonical subject and body text for export emails, used by both the
//! SMTP and mock services.

/// Subject line for stock export emails
pub const STOCK_EXPORT_SUBJECT: &str = "Stock Export";

/// Generate plain-text body for a stock export email.
pub fn stock_export_text() -> String {
    "Please find attached your stock export.".to_string()
}
