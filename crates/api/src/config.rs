use chrono::Duration;
use pravo_core::auth::{DEFAULT_MAIL_TIMEOUT, DEFAULT_MIN_PASSWORD_LENGTH};
use pravo_core::password::HasherConfig;
use pravo_core::session::{SessionSigner, SigningError, DEFAULT_SESSION_TTL_DAYS};

/// A required variable is missing or a value does not parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Session token configuration.
#[derive(Clone)]
pub struct SessionConfig {
    /// HMAC-SHA256 secret used to sign and verify session tokens.
    pub secret: String,
    /// Session lifetime in days (default: 7).
    pub ttl_days: i64,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl_days", &self.ttl_days)
            .finish()
    }
}

impl SessionConfig {
    /// | Env Var            | Required | Default |
    /// |--------------------|----------|---------|
    /// | `JWT_SECRET`       | **yes**  | --      |
    /// | `SESSION_TTL_DAYS` | no       | `7`     |
    ///
    /// An empty `JWT_SECRET` is rejected here, at startup.
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if secret.is_empty() {
            return Err(ConfigError::Empty("JWT_SECRET"));
        }
        let ttl_days = parse_or(lookup, "SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS)?;
        Ok(Self { secret, ttl_days })
    }

    /// Build the signer this configuration describes.
    pub fn signer(&self) -> Result<SessionSigner, SigningError> {
        SessionSigner::new(&self.secret, Duration::days(self.ttl_days))
    }
}

/// Server configuration loaded from environment variables.
///
/// Everything except `JWT_SECRET` has a default suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). A timed-out request
    /// drops its in-flight store and hashing futures.
    pub request_timeout_secs: u64,
    /// Minimum accepted password length at registration (default: `1`).
    /// Empty passwords are refused even when this is `0`.
    pub min_password_length: usize,
    /// Upper bound on the verification-mail hand-off during registration
    /// (default: `10`). Keep it well under `request_timeout_secs`.
    pub mail_timeout_secs: u64,
    /// Argon2id cost parameters.
    pub hasher: HasherConfig,
    /// Session token configuration (secret, lifetime).
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `8080`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `MIN_PASSWORD_LENGTH`    | `1`                        |
    /// | `MAIL_TIMEOUT_SECS`      | `10`                       |
    /// | `PASSWORD_HASH_MEMORY_KIB` | `65536`                  |
    /// | `PASSWORD_HASH_ITERATIONS` | `3`                      |
    /// | `PASSWORD_HASH_PARALLELISM` | `1`                     |
    ///
    /// plus the variables read by [`SessionConfig`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "PORT", 8080)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let min_password_length =
            parse_or(&lookup, "MIN_PASSWORD_LENGTH", DEFAULT_MIN_PASSWORD_LENGTH)?;
        let mail_timeout_secs =
            parse_or(&lookup, "MAIL_TIMEOUT_SECS", DEFAULT_MAIL_TIMEOUT.as_secs())?;
        if mail_timeout_secs >= request_timeout_secs {
            return Err(ConfigError::Invalid {
                var: "MAIL_TIMEOUT_SECS",
                value: mail_timeout_secs.to_string(),
            });
        }

        let defaults = HasherConfig::default();
        let hasher = HasherConfig {
            memory_kib: parse_or(&lookup, "PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };

        let session = SessionConfig::from_lookup(&lookup)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            min_password_length,
            mail_timeout_secs,
            hasher,
            session,
        })
    }

    pub fn mail_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.mail_timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
