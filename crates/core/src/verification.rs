//! One-time email verification tokens.
//!
//! Tokens are opaque random strings; only their SHA-256 hash is handed to the
//! store so a database leak does not let anyone verify an address.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the plaintext token. 43 alphanumeric characters carry ~256 bits.
pub const TOKEN_LENGTH: usize = 43;

/// A newly generated verification token.
pub struct GeneratedToken {
    /// Sent to the user exactly once, never stored.
    pub plaintext: String,
    /// SHA-256 hex digest of `plaintext`, persisted by the store.
    pub hash: String,
}

/// Generate a new URL-safe verification token from the thread-local CSPRNG.
pub fn generate_verification_token() -> GeneratedToken {
    let plaintext: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    let hash = hash_verification_token(&plaintext);
    GeneratedToken { plaintext, hash }
}

/// Compute the SHA-256 hex digest of a verification token.
pub fn hash_verification_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
