//! The user store contract.
//!
//! Every operation is atomic with respect to concurrent callers. Exclusivity
//! for duplicate registrations and double verification lives here, not in the
//! service: a duplicate email is reported as [`StoreError::UniqueViolation`]
//! and a lost verification race as `Ok(false)`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::types::UserId;
use crate::user::{EmailVerificationToken, NewUser, User};

/// Name of the unique constraint on user emails. A `UniqueViolation`
/// carrying this name means the email is taken.
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "uq_users_email";

/// Name of the unique constraint on verification token hashes.
pub const TOKEN_UNIQUE_CONSTRAINT: &str = "uq_email_verifications_token_hash";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any backend failure other than the two above.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new, unverified user. Fails with `UniqueViolation` if the
    /// email is already on file.
    async fn create_user(&self, input: &NewUser) -> Result<User, StoreError>;

    /// Exact-match lookup by email.
    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError>;

    /// Record a pending verification token (by hash) for `user_id`.
    async fn create_verification_token(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> Result<(), StoreError>;

    /// Persist a new, unverified user and its first verification token as
    /// one unit: either both rows exist afterwards or neither does.
    async fn create_user_with_verification_token(
        &self,
        input: &NewUser,
        token_hash: &str,
    ) -> Result<User, StoreError>;

    /// Move the token from pending to consumed and mark its owner verified,
    /// in one atomic step. Returns `false` if the token is unknown or was
    /// already consumed.
    async fn consume_verification_token(&self, token_hash: &str) -> Result<bool, StoreError>;
}

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    /// email -> user id, the unique index.
    emails: HashMap<String, UserId>,
    /// token hash -> token row.
    tokens: HashMap<String, EmailVerificationToken>,
}

impl Tables {
    fn insert_user(&mut self, input: &NewUser) -> User {
        let user = User {
            id: input.id,
            email: input.email.clone(),
            name: input.name.clone(),
            password_hash: input.password_hash.clone(),
            is_verified: false,
            created_at: Utc::now(),
        };
        self.emails.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user.clone());
        user
    }

    fn insert_token(&mut self, user_id: UserId, token_hash: &str) {
        self.tokens.insert(
            token_hash.to_owned(),
            EmailVerificationToken {
                id: Uuid::new_v4(),
                user_id,
                token_hash: token_hash.to_owned(),
                created_at: Utc::now(),
                consumed_at: None,
            },
        );
    }

    fn check_email_free(&self, email: &str) -> Result<(), StoreError> {
        if self.emails.contains_key(email) {
            return Err(StoreError::UniqueViolation(EMAIL_UNIQUE_CONSTRAINT.into()));
        }
        Ok(())
    }

    fn check_token_free(&self, token_hash: &str) -> Result<(), StoreError> {
        if self.tokens.contains_key(token_hash) {
            return Err(StoreError::UniqueViolation(TOKEN_UNIQUE_CONSTRAINT.into()));
        }
        Ok(())
    }
}

/// Process-local [`UserStore`] used by tests and local runs without Postgres.
#[derive(Default)]
pub struct InMemoryUserStore {
    tables: Mutex<Tables>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    /// All tokens (pending and consumed) owned by `user_id`.
    pub async fn tokens_for(&self, user_id: UserId) -> Vec<EmailVerificationToken> {
        self.tables
            .lock()
            .await
            .tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, input: &NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.check_email_free(&input.email)?;
        Ok(tables.insert_user(input))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let tables = self.tables.lock().await;
        tables
            .emails
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.tables
            .lock()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_verification_token(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::NotFound);
        }
        tables.check_token_free(token_hash)?;
        tables.insert_token(user_id, token_hash);
        Ok(())
    }

    async fn create_user_with_verification_token(
        &self,
        input: &NewUser,
        token_hash: &str,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.check_email_free(&input.email)?;
        tables.check_token_free(token_hash)?;
        let user = tables.insert_user(input);
        tables.insert_token(user.id, token_hash);
        Ok(user)
    }

    async fn consume_verification_token(&self, token_hash: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(token) = tables.tokens.get(token_hash) else {
            return Ok(false);
        };
        if token.is_consumed() {
            return Ok(false);
        }
        let user_id = token.user_id;
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(false);
        };
        user.is_verified = true;

        if let Some(token) = tables.tokens.get_mut(token_hash) {
            token.consumed_at = Some(Utc::now());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Alice".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let store = InMemoryUserStore::new();
        let input = new_user("alice@example.com");
        let created = store.create_user(&input).await.unwrap();

        assert_eq!(created.id, input.id);
        assert!(!created.is_verified);

        let fetched = store.get_user_by_email("alice@example.com").await.unwrap();
        assert_eq!(fetched.id, input.id);
        let by_id = store.get_user_by_id(input.id).await.unwrap();
        assert_eq!(by_id.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryUserStore::new();
        store.create_user(&new_user("dup@example.com")).await.unwrap();

        let result = store.create_user(&new_user("dup@example.com")).await;
        assert_matches!(result, Err(StoreError::UniqueViolation(_)));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_email_lookup_is_exact_match() {
        let store = InMemoryUserStore::new();
        store.create_user(&new_user("Case@example.com")).await.unwrap();

        let result = store.get_user_by_email("case@example.com").await;
        assert_matches!(result, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_consume_token_once() {
        let store = InMemoryUserStore::new();
        let user = store.create_user(&new_user("bob@example.com")).await.unwrap();
        store.create_verification_token(user.id, "hash-1").await.unwrap();

        assert!(store.consume_verification_token("hash-1").await.unwrap());
        assert!(!store.consume_verification_token("hash-1").await.unwrap());

        let user = store.get_user_by_id(user.id).await.unwrap();
        assert!(user.is_verified);
        let tokens = store.tokens_for(user.id).await;
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_consumed());
    }

    #[tokio::test]
    async fn test_consume_unknown_token() {
        let store = InMemoryUserStore::new();
        assert!(!store.consume_verification_token("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_token_for_missing_user() {
        let store = InMemoryUserStore::new();
        let result = store.create_verification_token(Uuid::new_v4(), "h").await;
        assert_matches!(result, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_concurrent_consume_has_one_winner() {
        let store = Arc::new(InMemoryUserStore::new());
        let user = store.create_user(&new_user("race@example.com")).await.unwrap();
        store.create_verification_token(user.id, "race").await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.consume_verification_token("race").await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_create_user_with_token_is_all_or_nothing() {
        let store = InMemoryUserStore::new();
        let first = store
            .create_user_with_verification_token(&new_user("one@example.com"), "shared")
            .await
            .unwrap();
        assert_eq!(store.tokens_for(first.id).await.len(), 1);

        // A colliding token hash must not leave the second user behind.
        let result = store
            .create_user_with_verification_token(&new_user("two@example.com"), "shared")
            .await;
        assert_matches!(
            result,
            Err(StoreError::UniqueViolation(c)) if c == TOKEN_UNIQUE_CONSTRAINT
        );
        assert_eq!(store.user_count().await, 1);
        assert_matches!(
            store.get_user_by_email("two@example.com").await,
            Err(StoreError::NotFound)
        );

        // A taken email must not leave a token behind.
        let dup = new_user("one@example.com");
        let result = store
            .create_user_with_verification_token(&dup, "fresh")
            .await;
        assert_matches!(
            result,
            Err(StoreError::UniqueViolation(c)) if c == EMAIL_UNIQUE_CONSTRAINT
        );
        assert!(!store.consume_verification_token("fresh").await.unwrap());
    }

    #[tokio::test]
    async fn test_consume_for_vanished_user_leaves_token_pending() {
        let store = InMemoryUserStore::new();
        let user = store
            .create_user_with_verification_token(&new_user("gone@example.com"), "orphan")
            .await
            .unwrap();
        store.tables.lock().await.users.remove(&user.id);

        assert!(!store.consume_verification_token("orphan").await.unwrap());
        let tokens = store.tokens_for(user.id).await;
        assert_eq!(tokens.len(), 1);
        assert!(!tokens[0].is_consumed());
    }
}
