//! Email notifications for investors.
//!
//! Uses `lettre` for SMTP transport. Delivery is best-effort: callers never
//! see a failure, it is only logged.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Fire-and-forget notification sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers a message. Never fails from the caller's point of view.
    async fn notify(&self, to: &str, subject: &str, body: &str);
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let Some(creds) = self.credentials() else {
            tracing::warn!(host = %self.config.smtp_host, "SMTP without TLS");
            return Ok(
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
                    .port(self.config.smtp_port)
                    .build(),
            );
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| EmailError::SendError(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();
        Ok(transport)
    }

    /// Credentials for the TLS relay. `None` in plaintext mode, so they never
    /// cross an unencrypted connection.
    fn credentials(&self) -> Option<Credentials> {
        if self.config.allow_plaintext {
            return None;
        }
        Some(Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        ))
    }

    /// Builds the message without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error if either address is invalid.
    pub fn build_message(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<Message, EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))
    }

    /// Sends a generic email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be built or sent.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let email = self.build_message(to_email, subject, body)?;

        let transport = self.create_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailService {
    async fn notify(&self, to: &str, subject: &str, body: &str) {
        if !self.config.enabled {
            tracing::info!(to, subject, "email delivery disabled, notification logged only");
            return;
        }

        if let Err(e) = self.send_email(to, subject, body).await {
            tracing::warn!(to, subject, error = %e, "failed to deliver notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_valid() {
        let service = EmailService::new(EmailConfig::default());
        let message = service.build_message(
            "investor@example.com",
            "Investment Initiated",
            "Your investment of $1000 has been initiated.",
        );
        assert!(message.is_ok());
    }

    #[test]
    fn test_build_message_invalid_recipient() {
        let service = EmailService::new(EmailConfig::default());
        let result = service.build_message("not-an-address", "subject", "body");
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }

    #[test]
    fn test_credentials_only_over_tls() {
        let tls = EmailService::new(EmailConfig {
            smtp_username: "mailer".to_string(),
            smtp_password: "secret".to_string(),
            ..EmailConfig::default()
        });
        assert!(tls.credentials().is_some());
        assert!(tls.create_transport().is_ok());

        let plaintext = EmailService::new(EmailConfig {
            smtp_username: "mailer".to_string(),
            smtp_password: "secret".to_string(),
            allow_plaintext: true,
            ..EmailConfig::default()
        });
        assert!(plaintext.credentials().is_none());
        assert!(plaintext.create_transport().is_ok());
    }

    #[tokio::test]
    async fn test_notify_disabled_does_not_fail() {
        let service = EmailService::new(EmailConfig::default());
        service
            .notify("investor@example.com", "Investment Cancelled", "body")
            .await;
    }
}
