//! Repository for the `users` table.

use pravo_core::types::UserId;
use pravo_core::user::NewUser;
use sqlx::PgPool;

use crate::models::user::UserRow;
use crate::repositories::VerificationTokenRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, name, password_hash, is_verified, created_at";

/// Provides the user queries the auth core needs.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new unverified user, returning the created row.
    ///
    /// A duplicate email violates `uq_users_email` (SQLSTATE 23505).
    pub async fn create(pool: &PgPool, input: &NewUser) -> Result<UserRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, email, name, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(input.id)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Insert a new unverified user and its first verification token in one
    /// transaction. Any failure rolls back both rows.
    pub async fn create_with_verification_token(
        pool: &PgPool,
        input: &NewUser,
        token_hash: &str,
    ) -> Result<UserRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO users (id, email, name, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, UserRow>(&query)
            .bind(input.id)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.password_hash)
            .fetch_one(&mut *tx)
            .await?;

        VerificationTokenRepo::create_in(&mut tx, user.id, token_hash).await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Count all users.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }
}
