//! Email verification token model.

use pravo_core::types::{Timestamp, UserId};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `email_verifications` table.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationRow {
    pub id: Uuid,
    pub user_id: UserId,
    pub token_hash: String,
    pub created_at: Timestamp,
    pub consumed_at: Option<Timestamp>,
}

impl From<VerificationRow> for pravo_core::user::EmailVerificationToken {
    fn from(row: VerificationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            created_at: row.created_at,
            consumed_at: row.consumed_at,
        }
    }
}
