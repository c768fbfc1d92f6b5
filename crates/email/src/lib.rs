//! Stock Export Email Service
//!
//! Provides email delivery for spreadsheet exports with support for:
//! - SMTP relay delivery with authentication for production
//! - Mock email service for testing and development
//! - File attachments read from local disk

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod content;
pub mod mock;
pub mod smtp;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    Configuration(String),

    #[error("Email validation error: {0}")]
    Validation(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to read attachment: {0}")]
    Attachment(#[from] std::io::Error),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// File attached to an outgoing email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl EmailAttachment {
    pub fn new(filename: String, content_type: String, content: Vec<u8>) -> Self {
        Self {
            filename,
            content_type,
            content,
        }
    }

    /// Read an attachment from disk, naming it after the file
    pub async fn from_path(path: &Path, content_type: &str) -> Result<Self, EmailError> {
        let content = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());

        Ok(Self::new(filename, content_type.to_string(), content))
    }
}

/// Email message to be sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body_text: String,
    pub attachments: Vec<EmailAttachment>,
    pub metadata: HashMap<String, String>,
}

impl EmailMessage {
    /// Create a new email message
    pub fn new(to: String, from: String, subject: String, body_text: String) -> Self {
        Self {
            to,
            from,
            subject,
            body_text,
            attachments: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a file
    pub fn with_attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Add metadata for tracking
    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

/// Email delivery receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailReceipt {
    pub message_id: String,
    pub provider: String,
    pub metadata: HashMap<String, String>,
}

/// Email service configuration
#[derive(Clone)]
pub struct EmailConfig {
    /// Email service provider (smtp, mock)
    pub provider: String,
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP relay port (STARTTLS)
    pub smtp_port: u16,
    /// Sender address, also used as the SMTP username
    pub default_from: String,
    /// SMTP credential for the sender
    pub password: Option<String>,
    /// Enable email sending (can disable for testing)
    pub enabled: bool,
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("provider", &self.provider)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("default_from", &self.default_from)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl EmailConfig {
    /// Create email config from environment variables
    ///
    /// Reads the process environment as is; `.env` loading happens once in
    /// `stockexport_common::Config::from_env`.
    pub fn from_env() -> Result<Self, EmailError> {
        let provider = std::env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "smtp".to_string());

        let smtp_host =
            std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());

        let smtp_port = match std::env::var("SMTP_PORT") {
            Ok(port) => port
                .parse()
                .map_err(|_| EmailError::Configuration(format!("Invalid SMTP_PORT: {}", port)))?,
            Err(_) => 587,
        };

        let default_from = std::env::var("EMAIL_FROM").unwrap_or_default();
        let password = std::env::var("EMAIL_PASSWORD").ok();

        let enabled = std::env::var("EMAIL_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        Ok(Self {
            provider,
            smtp_host,
            smtp_port,
            default_from,
            password,
            enabled,
        })
    }
}

/// Email service trait for different implementations
#[async_trait::async_trait]
pub trait EmailService: Send + Sync {
    /// Send an email message
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError>;

    /// Return the default "from" address for outgoing emails
    fn default_from(&self) -> String;

    /// Short provider name for logs
    fn service_name(&self) -> &'static str;

    /// Send a stock export spreadsheet to a recipient
    async fn send_stock_export(
        &self,
        recipient_email: &str,
        attachment: EmailAttachment,
    ) -> Result<EmailReceipt, EmailError> {
        let message = EmailMessage::new(
            recipient_email.to_string(),
            self.default_from(),
            content::STOCK_EXPORT_SUBJECT.to_string(),
            content::stock_export_text(),
        )
        .with_metadata("email_type".to_string(), "stock_export".to_string())
        .with_metadata("attachment".to_string(), attachment.filename.clone())
        .with_attachment(attachment);

        self.send_email(message).await
    }
}

/// Email service factory
pub struct EmailServiceFactory;

impl EmailServiceFactory {
    /// Create email service based on configuration
    pub fn create(config: EmailConfig) -> Result<Box<dyn EmailService>, EmailError> {
        if !config.enabled {
            tracing::info!("Email service disabled, using mock implementation");
            return Ok(Box::new(mock::MockEmailService::new_disabled()));
        }

        match config.provider.as_str() {
            "smtp" => {
                tracing::info!(
                    host = %config.smtp_host,
                    port = config.smtp_port,
                    "Creating SMTP email service"
                );
                let smtp_service = smtp::SmtpEmailService::new(config)?;
                Ok(Box::new(smtp_service))
            }
            "mock" => {
                tracing::info!("Creating mock email service");
                Ok(Box::new(mock::MockEmailService::new()))
            }
            provider => Err(EmailError::Configuration(format!(
                "Unknown email provider: {}. Supported providers: smtp, mock",
                provider
            ))),
        }
    }
}
