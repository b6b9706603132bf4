//! User entity model.

use pravo_core::types::{Timestamp, UserId};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- convert to [`pravo_core::user::UserResponse`]
/// before anything leaves the process.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub created_at: Timestamp,
}

impl From<UserRow> for pravo_core::user::User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            is_verified: row.is_verified,
            created_at: row.created_at,
        }
    }
}
