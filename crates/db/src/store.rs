//! [`UserStore`] backed by Postgres.

use async_trait::async_trait;
use pravo_core::store::{StoreError, UserStore};
use pravo_core::types::UserId;
use pravo_core::user::{NewUser, User};

use crate::repositories::{UserRepo, VerificationTokenRepo};
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres implementation of the user store contract.
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a sqlx error onto the store taxonomy.
///
/// - `RowNotFound` maps to `NotFound`.
/// - SQLSTATE 23505 maps to `UniqueViolation` carrying the constraint name.
/// - Everything else is `Unavailable`.
fn classify(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::UniqueViolation(db_err.constraint().unwrap_or("unknown").to_string())
        }
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, input: &NewUser) -> Result<User, StoreError> {
        UserRepo::create(&self.pool, input)
            .await
            .map(User::from)
            .map_err(classify)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(classify)?
            .map(User::from)
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify)?
            .map(User::from)
            .ok_or(StoreError::NotFound)
    }

    async fn create_verification_token(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> Result<(), StoreError> {
        VerificationTokenRepo::create(&self.pool, user_id, token_hash)
            .await
            .map_err(classify)?;
        tracing::debug!(%user_id, "Verification token stored");
        Ok(())
    }

    async fn create_user_with_verification_token(
        &self,
        input: &NewUser,
        token_hash: &str,
    ) -> Result<User, StoreError> {
        UserRepo::create_with_verification_token(&self.pool, input, token_hash)
            .await
            .map(User::from)
            .map_err(classify)
    }

    async fn consume_verification_token(&self, token_hash: &str) -> Result<bool, StoreError> {
        VerificationTokenRepo::consume(&self.pool, token_hash)
            .await
            .map_err(classify)
    }
}
