//! Repository for the `email_verifications` table.

use pravo_core::types::UserId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::verification::VerificationRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, created_at, consumed_at";

/// Provides operations on email verification tokens.
pub struct VerificationTokenRepo;

impl VerificationTokenRepo {
    /// Insert a pending token for `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: UserId,
        token_hash: &str,
    ) -> Result<VerificationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_verifications (id, user_id, token_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VerificationRow>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(token_hash)
            .fetch_one(pool)
            .await
    }

    /// Insert a pending token within an existing transaction.
    pub(crate) async fn create_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: UserId,
        token_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO email_verifications (id, user_id, token_hash)
             VALUES ($1, $2, $3)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_hash)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// List all tokens owned by a user, oldest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<VerificationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_verifications
             WHERE user_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, VerificationRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Consume a pending token and verify its owner in one transaction.
    ///
    /// The `consumed_at IS NULL` guard makes the first update a
    /// compare-and-swap: under concurrent calls Postgres serializes the row
    /// lock and only one caller gets a `user_id` back. Returns `true` if a
    /// user was verified.
    pub async fn consume(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user_id: Option<UserId> = sqlx::query_scalar(
            "UPDATE email_verifications SET consumed_at = NOW()
             WHERE token_hash = $1 AND consumed_at IS NULL
             RETURNING user_id",
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            tx.rollback().await?;
            return Ok(false);
        };

        let result = sqlx::query("UPDATE users SET is_verified = true WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
