//! Argon2id password hashing, verification, and strength validation.
//!
//! All password hashes use the Argon2id variant with a cryptographically random
//! salt generated via [`OsRng`]. The PHC string format is used for storage so
//! that algorithm parameters and salt are embedded in the hash itself, and
//! verification needs nothing but the stored string.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// Errors raised while hashing a password.
#[derive(Debug, thiserror::Error)]
pub enum HashingError {
    #[error("Refusing to hash an empty password")]
    EmptyPassword,

    #[error("Invalid Argon2 parameters: {0}")]
    Params(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    /// The blocking hashing task panicked or was cancelled.
    #[error("Password hashing task failed: {0}")]
    Join(String),
}

/// Default memory cost: 64 MiB.
pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;

/// Default number of passes.
pub const DEFAULT_ITERATIONS: u32 = 3;

/// Cost parameters for Argon2id.
///
/// The defaults put one hash in the low hundreds of milliseconds on a
/// server core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way password hashing as seen by the auth service.
pub trait PasswordHashing: Send + Sync {
    /// Hash a plaintext password with a fresh random salt.
    fn hash(&self, password: &str) -> Result<String, HashingError>;

    /// Check a plaintext password against a stored hash. Never errors: any
    /// problem with the stored hash is a mismatch.
    fn verify(&self, hash: &str, password: &str) -> bool;
}

/// Argon2id credential hasher.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}

impl CredentialHasher {
    /// Build a hasher with the given cost parameters.
    pub fn new(config: HasherConfig) -> Result<Self, HashingError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| HashingError::Params(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordHashing for CredentialHasher {
    /// Hash a plaintext password with a fresh random salt.
    ///
    /// Returns the PHC-formatted hash string (includes algorithm, params, salt, and hash).
    fn hash(&self, password: &str) -> Result<String, HashingError> {
        if password.is_empty() {
            return Err(HashingError::EmptyPassword);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HashingError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext password against a stored PHC hash.
    ///
    /// A malformed hash and a wrong password are indistinguishable: both
    /// return `false`. The digest comparison inside `argon2` is constant-time,
    /// and the cost parameters are read from the PHC string.
    fn verify(&self, hash: &str, password: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// [`PasswordHashing::hash`] on the blocking thread pool.
pub async fn hash_blocking(
    hasher: &Arc<dyn PasswordHashing>,
    password: &str,
) -> Result<String, HashingError> {
    let hasher = Arc::clone(hasher);
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| HashingError::Join(e.to_string()))?
}

/// [`PasswordHashing::verify`] on the blocking thread pool.
///
/// A failed blocking task counts as a mismatch.
pub async fn verify_blocking(
    hasher: &Arc<dyn PasswordHashing>,
    hash: &str,
    password: &str,
) -> bool {
    let hasher = Arc::clone(hasher);
    let hash = hash.to_owned();
    let password = password.to_owned();
    match tokio::task::spawn_blocking(move || hasher.verify(&hash, &password)).await {
        Ok(matched) => matched,
        Err(e) => {
            tracing::error!(error = %e, "Password verification task failed");
            false
        }
    }
}

/// Validate that a password meets minimum strength requirements.
///
/// An empty password is always rejected, whatever `min_length` says.
/// Otherwise enforces a minimum character length. Returns `Ok(())` when the
/// password is acceptable, or `Err` with a human-readable explanation.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password must not be empty".to_string());
    }
    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    Ok(())
}
