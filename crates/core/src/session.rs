//! Stateless session tokens.
//!
//! Session tokens are HS256-signed JWTs containing a [`SessionClaims`] payload.
//! Nothing is stored server-side: a token is valid exactly when its signature
//! checks out and `exp` is in the future. Rotating the secret invalidates
//! every outstanding token.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, UserId};

/// Default session lifetime in days.
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject -- the user's id.
    pub sub: UserId,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Signer misconfiguration or encoding failure.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Session signing secret must not be empty")]
    EmptySecret,

    #[error("Session lifetime must be positive")]
    InvalidTtl,

    #[error("Session token encoding failed: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Why a presented session token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Session token is invalid")]
    Invalid,

    #[error("Session token has expired")]
    Expired,
}

/// Issues and validates session tokens with a process-wide symmetric secret.
#[derive(Clone)]
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// Build a signer. An empty secret is rejected here so misconfiguration
    /// surfaces at startup rather than on the first login.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, SigningError> {
        if secret.is_empty() {
            return Err(SigningError::EmptySecret);
        }
        if ttl <= Duration::zero() {
            return Err(SigningError::InvalidTtl);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// Issue a token for `subject`, valid from now for the configured lifetime.
    pub fn issue(&self, subject: UserId) -> Result<SessionToken, SigningError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, subject: UserId, now: Timestamp) -> Result<SessionToken, SigningError> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            sub: subject,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(SessionToken { token, expires_at })
    }

    /// Check signature integrity, then expiry, and return the subject.
    pub fn validate(&self, token: &str) -> Result<UserId, TokenError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    /// Like [`Self::validate`] but returns the full claims.
    pub fn decode_claims(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
