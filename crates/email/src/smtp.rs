//! SMTP Email Service Implementation
//!
//! Delivers mail through an authenticated relay over STARTTLS using
//! lettre's tokio transport.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use crate::{EmailConfig, EmailError, EmailMessage, EmailReceipt, EmailService};

/// SMTP relay email service implementation
pub struct SmtpEmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl SmtpEmailService {
    /// Create a new SMTP email service
    ///
    /// No connection is opened here; each send dials the relay.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        if config.default_from.is_empty() {
            return Err(EmailError::Configuration(
                "EMAIL_FROM is required for the smtp provider".to_string(),
            ));
        }

        let password = config.password.clone().ok_or_else(|| {
            EmailError::Configuration("EMAIL_PASSWORD is required for the smtp provider".to_string())
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| {
                EmailError::Configuration(format!(
                    "Invalid SMTP relay {}: {}",
                    config.smtp_host, e
                ))
            })?
            .port(config.smtp_port)
            .credentials(Credentials::new(config.default_from.clone(), password))
            .build();

        Ok(Self { transport, config })
    }

    /// Convert email message to a MIME message
    fn build_message(&self, message: &EmailMessage) -> Result<Message, EmailError> {
        let from = parse_mailbox(&message.from)?;
        let to = parse_mailbox(&message.to)?;

        let builder = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.as_str());

        let text = SinglePart::plain(message.body_text.clone());

        let built = if message.attachments.is_empty() {
            builder.singlepart(text)
        } else {
            let mut parts = MultiPart::mixed().singlepart(text);
            for attachment in &message.attachments {
                let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                    EmailError::Build(format!(
                        "Invalid content type {}: {}",
                        attachment.content_type, e
                    ))
                })?;
                parts = parts.singlepart(
                    Attachment::new(attachment.filename.clone())
                        .body(attachment.content.clone(), content_type),
                );
            }
            builder.multipart(parts)
        };

        built.map_err(|e| EmailError::Build(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|e| EmailError::Validation(format!("Invalid email address {}: {}", address, e)))
}

#[async_trait::async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        tracing::info!(
            to = %message.to,
            attachments = message.attachments.len(),
            "Sending email via SMTP relay"
        );

        let mime = self.build_message(&message)?;
        let message_id = mime
            .headers()
            .get_raw("Message-ID")
            .map(str::to_string)
            .unwrap_or_else(|| format!("smtp-{}", Uuid::new_v4()));

        let response = self
            .transport
            .send(mime)
            .await
            .map_err(|e| EmailError::Smtp(e.to_string()))?;

        tracing::info!(
            message_id = %message_id,
            code = %response.code(),
            "Email accepted by SMTP relay"
        );

        Ok(EmailReceipt {
            message_id,
            provider: "smtp".to_string(),
            metadata: message.metadata.clone(),
        })
    }

    fn default_from(&self) -> String {
        self.config.default_from.clone()
    }

    fn service_name(&self) -> &'static str {
        "smtp"
    }
}
