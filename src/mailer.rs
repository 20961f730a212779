// src/mailer.rs
//! Mail delivery — the capability `send(to, subject, html)`.
//!
//! The batch loop depends on the [`Mailer`] trait; the SMTP implementation
//! is the only part of the program that talks to anything other than the
//! Notion API. `--dry-run` swaps in [`LogMailer`].

use crate::config::SmtpSettings;
use crate::error::AppError;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// The ability to deliver one HTML report.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &[String], subject: &str, html: &str) -> Result<(), AppError>;
}

/// Authenticated STARTTLS SMTP delivery.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, AppError> {
        let from: Mailbox = settings.user.parse().map_err(|e| {
            AppError::MissingConfiguration(format!(
                "SMTP user '{}' is not a valid sender address: {}",
                settings.user, e
            ))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| AppError::DeliveryFailed(format!("SMTP relay setup: {}", e)))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.pass.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &[String], subject: &str, html: &str) -> Result<(), AppError> {
        if to.is_empty() {
            return Err(AppError::DeliveryFailed(
                "empty recipient list".to_string(),
            ));
        }

        let mut builder = Message::builder().from(self.from.clone()).subject(subject);
        for address in to {
            let mailbox: Mailbox = address.parse().map_err(|e| {
                AppError::DeliveryFailed(format!("invalid recipient '{}': {}", address, e))
            })?;
            builder = builder.to(mailbox);
        }

        let message = builder
            .multipart(
                MultiPart::alternative().singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.to_string()),
                ),
            )
            .map_err(|e| AppError::DeliveryFailed(format!("message assembly: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::DeliveryFailed(e.to_string()))?;

        Ok(())
    }
}

/// Dry-run delivery: logs the report instead of sending it.
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &[String], subject: &str, html: &str) -> Result<(), AppError> {
        log::info!(
            "[dry-run] would send '{}' to {} ({} bytes of HTML)",
            subject,
            to.join(", "),
            html.len()
        );
        Ok(())
    }
}
