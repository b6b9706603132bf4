//! Error taxonomy of the auth core.

use crate::password::HashingError;
use crate::session::SigningError;

/// Every failure the [`crate::auth::AuthService`] can report.
///
/// The first group are expected domain outcomes (4xx at the HTTP edge); the
/// rest are infrastructure failures that [`AuthError::is_internal`] flags.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("A user with this email already exists")]
    UserExists,

    /// Unknown email and wrong password are deliberately the same variant.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email address has not been verified")]
    EmailNotVerified,

    /// Unknown or already-consumed verification token.
    #[error("Verification token is invalid or has already been used")]
    InvalidToken,

    #[error("Session token is invalid")]
    InvalidSession,

    #[error("Session token has expired")]
    SessionExpired,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("User store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AuthError {
    /// `true` for failures that are the server's fault rather than the caller's.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::Hashing(_) | AuthError::Signing(_) | AuthError::StoreUnavailable(_)
        )
    }
}
