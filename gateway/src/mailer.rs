//! # Mailer
//!
//! Sends the reset-code email for `POST /v1/resetcodes`. SPEC_FULL
//! requires SMTP credentials to come from configuration (see
//! `shared::config::SmtpConfig`); the transport itself is `lettre`,
//! grounded in this pack's `jaikoo-bloop` sibling's dependency choice
//! for the same concern.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use shared::config::SmtpConfig;
use shared::errors::ApiError;

/// Abstraction over sending the reset-code email, so handlers and tests
/// don't depend on a live SMTP server.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync {
    async fn send_reset_code(&self, to_email: &str, reset_code: &str) -> Result<(), ApiError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, ApiError> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| ApiError::MailError { message: e.to_string() })?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self { transport, from: config.from.clone() })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_reset_code(&self, to_email: &str, reset_code: &str) -> Result<(), ApiError> {
        let email = Message::builder()
            .from(self.from.parse().map_err(|e: lettre::address::AddressError| ApiError::MailError {
                message: e.to_string(),
            })?)
            .to(to_email.parse().map_err(|e: lettre::address::AddressError| ApiError::MailError {
                message: e.to_string(),
            })?)
            .subject("Password reset code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your password reset code is: {reset_code}\n\nThis code expires in 5 minutes."
            ))
            .map_err(|e| ApiError::MailError { message: e.to_string() })?;

        self.transport
            .send(email)
            .await
            .map_err(|e| ApiError::MailError { message: e.to_string() })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_mailer_can_be_programmed_to_fail() {
        let mut mock = MockMailer::new();
        mock.expect_send_reset_code()
            .returning(|_, _| Err(ApiError::MailError { message: "smtp down".into() }));

        let err = mock.send_reset_code("a@b.com", "123456").await.unwrap_err();
        assert!(matches!(err, ApiError::MailError { .. }));
    }
}
