//! User and verification-token entities shared by the store implementations.

use serde::Serialize;
use uuid::Uuid;

use crate::types::{Timestamp, UserId};

/// A persisted user.
///
/// Contains the password hash -- this type deliberately does not implement
/// `Serialize`. Use [`UserResponse`] for anything that leaves the process.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub created_at: Timestamp,
}

/// Public user representation (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub is_verified: bool,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

/// Input for [`crate::store::UserStore::create_user`].
///
/// The id is assigned by the caller so the service knows it before the
/// insert returns.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// A stored email verification token.
///
/// Only the SHA-256 digest of the token is kept. The token is `pending`
/// while `consumed_at` is `None` and `consumed` afterwards; there is no
/// transition back.
#[derive(Debug, Clone)]
pub struct EmailVerificationToken {
    pub id: Uuid,
    pub user_id: UserId,
    pub token_hash: String,
    pub created_at: Timestamp,
    pub consumed_at: Option<Timestamp>,
}

impl EmailVerificationToken {
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}
