//! Outbound verification mail contract.
//!
//! Delivery is fire-and-forget from the auth core's point of view: a failure
//! is reported back but never undoes a registration.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid email address: {0}")]
    Address(String),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("Mail transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait VerificationMailer: Send + Sync {
    /// Send the verification link carrying `token` to `email`.
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError>;
}
