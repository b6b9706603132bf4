//! Verification email delivery via SMTP.
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport to send the
//! account-verification link. Configuration is loaded from environment
//! variables; if `SMTP_HOST` is not set, [`MailConfig::from_env`] returns
//! `None` and [`LogMailer`] should be used instead.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use pravo_core::mail::{MailError, VerificationMailer};

// ---------------------------------------------------------------------------
// MailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@pravo.local";

/// Default base URL for verification links when `FRONTEND_URL` is not set.
const DEFAULT_FRONTEND_URL: &str = "http://localhost:8080";

/// Path of the verification endpoint, appended to the frontend URL.
const VERIFY_PATH: &str = "/api/v1/auth/verify";

const VERIFICATION_SUBJECT: &str = "Confirm your account";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
    /// Base URL the verification link points at.
    pub frontend_url: String,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                  |
    /// |-----------------|----------|--------------------------|
    /// | `SMTP_HOST`     | yes      | --                       |
    /// | `SMTP_PORT`     | no       | `587`                    |
    /// | `SMTP_FROM`     | no       | `noreply@pravo.local`    |
    /// | `SMTP_USER`     | no       | --                       |
    /// | `SMTP_PASSWORD` | no       | --                       |
    /// | `FRONTEND_URL`  | no       | `http://localhost:8080`  |
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let smtp_host = lookup("SMTP_HOST").filter(|h| !h.is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: lookup("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: lookup("SMTP_FROM").unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: lookup("SMTP_USER"),
            smtp_password: lookup("SMTP_PASSWORD"),
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
        })
    }

    /// The link a user follows to verify their address.
    pub fn verification_link(&self, token: &str) -> String {
        format!(
            "{}{VERIFY_PATH}?token={token}",
            self.frontend_url.trim_end_matches('/')
        )
    }
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Sends verification emails via SMTP.
pub struct SmtpMailer {
    config: MailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Create a mailer. The transport connects lazily on first send.
    pub fn new(config: MailConfig) -> Result<Self, MailError> {
        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| MailError::Transport(e.to_string()))?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: transport_builder.build(),
            config,
        })
    }

    /// Assemble the verification message without sending it.
    pub fn build_message(&self, to_email: &str, token: &str) -> Result<Message, MailError> {
        let body = verification_body(&self.config.verification_link(token));

        Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e: lettre::address::AddressError| MailError::Address(e.to_string()))?,
            )
            .to(to_email
                .parse()
                .map_err(|e: lettre::address::AddressError| MailError::Address(e.to_string()))?)
            .subject(VERIFICATION_SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

/// HTML body of the verification email.
fn verification_body(link: &str) -> String {
    format!(
        "<h2>Confirm your account</h2>\n\
         <p>Follow the link below to verify your email address:</p>\n\
         <a href=\"{link}\">{link}</a>"
    )
}

#[async_trait]
impl VerificationMailer for SmtpMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError> {
        let message = self.build_message(email, token)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!(to = email, "Verification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LogMailer
// ---------------------------------------------------------------------------

/// Stand-in used when SMTP is not configured.
///
/// Reports every send as failed so registration surfaces that no email went
/// out. The token itself is never logged.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl VerificationMailer for LogMailer {
    async fn send_verification(&self, email: &str, _token: &str) -> Result<(), MailError> {
        tracing::warn!(to = email, "SMTP not configured, verification email skipped");
        Err(MailError::Transport("SMTP is not configured".into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
