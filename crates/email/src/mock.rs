//! Mock Email Service Implementation
//!
//! Provides in-memory email capture for testing without an SMTP relay.
//! Captured messages keep their attachments so tests can inspect the
//! delivered spreadsheet.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EmailError, EmailMessage, EmailReceipt, EmailService};

const MOCK_FROM: &str = "exports@stockexport.local";

/// Email captured by the mock service
#[derive(Debug, Clone)]
pub struct CapturedEmail {
    pub message: EmailMessage,
    pub receipt: EmailReceipt,
    pub captured_at: DateTime<Utc>,
}

impl CapturedEmail {
    /// Number of attachments on the captured message
    pub fn attachment_count(&self) -> usize {
        self.message.attachments.len()
    }

    /// Raw bytes of the attachment with the given file name
    pub fn attachment_bytes(&self, filename: &str) -> Option<&[u8]> {
        self.message
            .attachments
            .iter()
            .find(|a| a.filename == filename)
            .map(|a| a.content.as_slice())
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Capture,
    Disabled,
    Failing(String),
}

/// Mock email service for testing
#[derive(Debug, Clone)]
pub struct MockEmailService {
    emails: Arc<Mutex<Vec<CapturedEmail>>>,
    email_by_recipient: Arc<Mutex<HashMap<String, Vec<CapturedEmail>>>>,
    attempts: Arc<AtomicUsize>,
    mode: Mode,
}

impl MockEmailService {
    /// Create a new mock email service
    pub fn new() -> Self {
        Self::with_mode(Mode::Capture)
    }

    /// Create a disabled mock email service that acknowledges without capturing
    pub fn new_disabled() -> Self {
        Self::with_mode(Mode::Disabled)
    }

    /// Create a mock whose every send fails like an unreachable relay
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_mode(Mode::Failing(reason.into()))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            emails: Arc::new(Mutex::new(Vec::new())),
            email_by_recipient: Arc::new(Mutex::new(HashMap::new())),
            attempts: Arc::new(AtomicUsize::new(0)),
            mode,
        }
    }

    /// Get all captured emails
    pub fn get_all_emails(&self) -> Vec<CapturedEmail> {
        lock(&self.emails).clone()
    }

    /// Get emails sent to a specific recipient
    pub fn get_emails_for_recipient(&self, email: &str) -> Vec<CapturedEmail> {
        lock(&self.email_by_recipient)
            .get(email)
            .cloned()
            .unwrap_or_default()
    }

    /// Get the most recent email for a recipient
    pub fn get_latest_email(&self, email: &str) -> Option<CapturedEmail> {
        self.get_emails_for_recipient(email)
            .into_iter()
            .max_by_key(|e| e.captured_at)
    }

    /// Get count of emails sent
    pub fn email_count(&self) -> usize {
        lock(&self.emails).len()
    }

    /// Number of `send_email` calls in any mode, failed ones included
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Clear all captured emails and the attempt counter
    pub fn clear(&self) {
        lock(&self.emails).clear();
        lock(&self.email_by_recipient).clear();
        self.attempts.store(0, Ordering::SeqCst);
    }

    /// Check if email sending is enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self.mode, Mode::Disabled)
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

// A panicking test thread must not hide earlier captures from the others.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait::async_trait]
impl EmailService for MockEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        match &self.mode {
            Mode::Disabled => {
                tracing::warn!("Mock email service disabled, skipping send");
                return Ok(EmailReceipt {
                    message_id: format!("disabled-{}", Uuid::new_v4()),
                    provider: "mock-disabled".to_string(),
                    metadata: message.metadata.clone(),
                });
            }
            Mode::Failing(reason) => {
                tracing::warn!(to = %message.to, "Mock email service failing send");
                return Err(EmailError::Smtp(reason.clone()));
            }
            Mode::Capture => {}
        }

        tracing::info!("Mock email service capturing email to: {}", message.to);

        let receipt = EmailReceipt {
            message_id: format!("mock-{}", Uuid::new_v4()),
            provider: "mock".to_string(),
            metadata: message.metadata.clone(),
        };

        let captured = CapturedEmail {
            message: message.clone(),
            receipt: receipt.clone(),
            captured_at: Utc::now(),
        };

        lock(&self.emails).push(captured.clone());

        lock(&self.email_by_recipient)
            .entry(message.to)
            .or_default()
            .push(captured);

        tracing::info!(
            "Email captured successfully, message ID: {}",
            receipt.message_id
        );

        Ok(receipt)
    }

    fn default_from(&self) -> String {
        MOCK_FROM.to_string()
    }

    fn service_name(&self) -> &'static str {
        "mock"
    }
}
