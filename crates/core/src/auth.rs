//! The authentication state machine.
//!
//! A user moves `Unregistered -> Unverified -> Verified` and never back.
//! [`AuthService`] owns that progression; it holds no mutable state of its
//! own and relies on the store's atomic operations for exclusivity, so one
//! instance is shared across all request tasks.
//!
//! Emails are matched exactly as given. Any normalization (trimming, case
//! folding) belongs to the caller.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::error::AuthError;
use crate::mail::VerificationMailer;
use crate::password::{
    hash_blocking, validate_password_strength, verify_blocking, PasswordHashing,
};
use crate::session::{SessionSigner, SessionToken, TokenError};
use crate::store::{StoreError, UserStore, EMAIL_UNIQUE_CONSTRAINT};
use crate::types::UserId;
use crate::user::{NewUser, UserResponse};
use crate::verification::{generate_verification_token, hash_verification_token};

/// Default minimum password length accepted at registration: any non-empty
/// password.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 1;

/// Default upper bound on handing a verification mail to the mailer.
pub const DEFAULT_MAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Input for [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Input for [`AuthService::login`].
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: UserId,
    /// `false` when the verification mail could not be handed off in time.
    /// The account still exists; the caller decides whether to tell the user.
    pub verification_email_sent: bool,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: UserId,
    pub session: SessionToken,
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHashing>,
    signer: SessionSigner,
    mailer: Arc<dyn VerificationMailer>,
    min_password_length: usize,
    mail_timeout: Duration,
    /// Verified against when the email is unknown, so both login failures
    /// cost one hash verification.
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHashing>,
        signer: SessionSigner,
        mailer: Arc<dyn VerificationMailer>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash(&Uuid::new_v4().to_string())?;
        Ok(Self {
            store,
            hasher,
            signer,
            mailer,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            mail_timeout: DEFAULT_MAIL_TIMEOUT,
            dummy_hash,
        })
    }

    /// Minimum password length in characters. An empty password is refused
    /// even at `0`.
    pub fn with_min_password_length(mut self, min_password_length: usize) -> Self {
        self.min_password_length = min_password_length;
        self
    }

    /// How long `register` waits on the mailer before reporting the
    /// verification mail as not sent.
    pub fn with_mail_timeout(mut self, mail_timeout: Duration) -> Self {
        self.mail_timeout = mail_timeout;
        self
    }

    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    /// Register a new, unverified user and send the verification mail.
    ///
    /// 1. Reject when the email is already on file. Only a definite
    ///    "not found" lets registration continue; any other lookup failure
    ///    fails closed.
    /// 2. Hash the password. A hashing failure aborts before anything is stored.
    /// 3. Persist the user together with a fresh verification token, in one
    ///    atomic store call. A concurrent registration that wins the unique
    ///    index race surfaces as `UserExists`.
    /// 4. Hand the token to the mailer, waiting at most the mail timeout.
    ///    Failure or timeout is logged and reported in
    ///    [`Registration::verification_email_sent`].
    pub async fn register(&self, input: RegisterInput) -> Result<Registration, AuthError> {
        if input.email.is_empty() {
            return Err(AuthError::Validation("Email must not be empty".into()));
        }
        if input.name.is_empty() {
            return Err(AuthError::Validation("Name must not be empty".into()));
        }
        validate_password_strength(&input.password, self.min_password_length)
            .map_err(AuthError::Validation)?;

        match self.store.get_user_by_email(&input.email).await {
            Ok(_) => return Err(AuthError::UserExists),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(store_failure(e)),
        }

        let password_hash = hash_blocking(&self.hasher, &input.password).await?;

        let new_user = NewUser {
            id: Uuid::new_v4(),
            email: input.email,
            name: input.name,
            password_hash,
        };
        let token = generate_verification_token();
        let user = match self
            .store
            .create_user_with_verification_token(&new_user, &token.hash)
            .await
        {
            Ok(user) => user,
            Err(StoreError::UniqueViolation(c)) if c == EMAIL_UNIQUE_CONSTRAINT => {
                return Err(AuthError::UserExists)
            }
            Err(e) => return Err(store_failure(e)),
        };

        tracing::info!(user_id = %user.id, "User registered");

        let send = self.mailer.send_verification(&user.email, &token.plaintext);
        let verification_email_sent = match tokio::time::timeout(self.mail_timeout, send).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(user_id = %user.id, error = %e, "Verification email not sent");
                false
            }
            Err(_) => {
                tracing::warn!(
                    user_id = %user.id,
                    timeout_ms = self.mail_timeout.as_millis() as u64,
                    "Verification email timed out"
                );
                false
            }
        };

        Ok(Registration {
            user_id: user.id,
            verification_email_sent,
        })
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`, and
    /// so does any other lookup failure: login never tells the caller
    /// whether an account exists. `EmailNotVerified` is only reported after
    /// the password checked out, so it reveals nothing to someone without
    /// the password.
    pub async fn login(&self, input: LoginInput) -> Result<LoginOutcome, AuthError> {
        let user = match self.store.get_user_by_email(&input.email).await {
            Ok(user) => user,
            Err(e) => {
                if !matches!(e, StoreError::NotFound) {
                    tracing::error!(error = %e, "User lookup failed during login");
                }
                verify_blocking(&self.hasher, &self.dummy_hash, &input.password).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_blocking(&self.hasher, &user.password_hash, &input.password).await {
            tracing::debug!(user_id = %user.id, "Login rejected: bad credentials");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_verified {
            tracing::debug!(user_id = %user.id, "Login rejected: email not verified");
            return Err(AuthError::EmailNotVerified);
        }

        let session = self.signer.issue(user.id)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            user_id: user.id,
            session,
        })
    }

    /// Consume a verification token and mark its owner verified.
    pub async fn verify_email(&self, token: &str) -> Result<(), AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let consumed = self
            .store
            .consume_verification_token(&hash_verification_token(token))
            .await
            .map_err(store_failure)?;

        if !consumed {
            return Err(AuthError::InvalidToken);
        }
        tracing::info!("Email verified");
        Ok(())
    }

    /// Resolve a session token to its subject.
    pub fn validate_session(&self, token: &str) -> Result<UserId, AuthError> {
        self.signer.validate(token).map_err(|e| match e {
            TokenError::Expired => AuthError::SessionExpired,
            TokenError::Invalid => AuthError::InvalidSession,
        })
    }

    /// Public profile of the user a session belongs to.
    ///
    /// A session whose subject no longer exists is treated as invalid.
    pub async fn profile(&self, user_id: UserId) -> Result<UserResponse, AuthError> {
        match self.store.get_user_by_id(user_id).await {
            Ok(user) => Ok(UserResponse::from(&user)),
            Err(StoreError::NotFound) => Err(AuthError::InvalidSession),
            Err(e) => Err(store_failure(e)),
        }
    }
}

fn store_failure(err: StoreError) -> AuthError {
    tracing::error!(error = %err, "User store failure");
    AuthError::StoreUnavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::mail::MailError;
    use crate::password::{CredentialHasher, HashingError, HasherConfig};
    use crate::store::InMemoryUserStore;
    use crate::user::User;

    /// Records every verification mail instead of sending it.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingMailer {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn last_token_for(&self, email: &str) -> String {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(to, _)| to == email)
                .map(|(_, token)| token.clone())
                .expect("a verification mail should have been sent")
        }
    }

    #[async_trait]
    impl VerificationMailer for RecordingMailer {
        async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Transport("connection refused".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((email.to_string(), token.to_string()));
            Ok(())
        }
    }

    /// A store whose every call fails with a backend error.
    struct BrokenStore;

    #[async_trait]
    impl UserStore for BrokenStore {
        async fn create_user(&self, _: &NewUser) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn get_user_by_email(&self, _: &str) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn get_user_by_id(&self, _: UserId) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn create_verification_token(&self, _: UserId, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn create_user_with_verification_token(
            &self,
            _: &NewUser,
            _: &str,
        ) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn consume_verification_token(&self, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    /// Wraps an in-memory store; while `fail_writes` is set, the combined
    /// user + token insert fails the way an aborted transaction does.
    struct FlakyStore {
        inner: InMemoryUserStore,
        fail_writes: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl UserStore for FlakyStore {
        async fn create_user(&self, input: &NewUser) -> Result<User, StoreError> {
            self.inner.create_user(input).await
        }
        async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
            self.inner.get_user_by_email(email).await
        }
        async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
            self.inner.get_user_by_id(id).await
        }
        async fn create_verification_token(
            &self,
            user_id: UserId,
            token_hash: &str,
        ) -> Result<(), StoreError> {
            self.inner.create_verification_token(user_id, token_hash).await
        }
        async fn create_user_with_verification_token(
            &self,
            input: &NewUser,
            token_hash: &str,
        ) -> Result<User, StoreError> {
            if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection reset".into()));
            }
            self.inner
                .create_user_with_verification_token(input, token_hash)
                .await
        }
        async fn consume_verification_token(&self, token_hash: &str) -> Result<bool, StoreError> {
            self.inner.consume_verification_token(token_hash).await
        }
    }

    /// Never finishes sending.
    struct HangingMailer;

    #[async_trait]
    impl VerificationMailer for HangingMailer {
        async fn send_verification(&self, _: &str, _: &str) -> Result<(), MailError> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    /// Argon2 hasher that fails for one specific password.
    struct RejectingHasher {
        inner: CredentialHasher,
        reject: &'static str,
    }

    impl PasswordHashing for RejectingHasher {
        fn hash(&self, password: &str) -> Result<String, HashingError> {
            if password == self.reject {
                return Err(HashingError::Hash("memory allocation failed".into()));
            }
            self.inner.hash(password)
        }
        fn verify(&self, hash: &str, password: &str) -> bool {
            self.inner.verify(hash, password)
        }
    }

    struct Harness {
        service: Arc<AuthService>,
        store: Arc<InMemoryUserStore>,
        mailer: Arc<RecordingMailer>,
    }

    fn fast_argon2() -> CredentialHasher {
        CredentialHasher::new(HasherConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn fast_hasher() -> Arc<dyn PasswordHashing> {
        Arc::new(fast_argon2())
    }

    fn signer() -> SessionSigner {
        SessionSigner::new("unit-test-secret", Duration::days(7)).unwrap()
    }

    fn harness_with(mailer: RecordingMailer) -> Harness {
        let store = Arc::new(InMemoryUserStore::new());
        let mailer = Arc::new(mailer);
        let service = AuthService::new(
            store.clone(),
            fast_hasher(),
            signer(),
            mailer.clone(),
        )
        .unwrap();
        Harness {
            service: Arc::new(service),
            store,
            mailer,
        }
    }

    fn harness() -> Harness {
        harness_with(RecordingMailer::default())
    }

    fn register_input(email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            name: "Alice".to_string(),
            password: password.to_string(),
        }
    }

    fn login_input(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_creates_one_unverified_user_and_one_token() {
        let h = harness();
        let reg = h
            .service
            .register(register_input("alice@example.com", "pw1234"))
            .await
            .unwrap();

        assert!(reg.verification_email_sent);
        assert_eq!(h.store.user_count().await, 1);

        let user = h.store.get_user_by_id(reg.user_id).await.unwrap();
        assert!(!user.is_verified);
        assert_ne!(user.password_hash, "pw1234");
        assert!(user.password_hash.starts_with("$argon2id$"));

        let tokens = h.store.tokens_for(reg.user_id).await;
        assert_eq!(tokens.len(), 1);
        assert!(!tokens[0].is_consumed());

        // The store sees only the hash of what was mailed.
        let mailed = h.mailer.last_token_for("alice@example.com");
        assert_eq!(tokens[0].token_hash, hash_verification_token(&mailed));
    }

    #[tokio::test]
    async fn duplicate_registration_fails_without_new_rows() {
        let h = harness();
        h.service
            .register(register_input("dup@example.com", "pw1234"))
            .await
            .unwrap();

        let result = h
            .service
            .register(register_input("dup@example.com", "other-pw"))
            .await;
        assert_matches!(result, Err(AuthError::UserExists));
        assert_eq!(h.store.user_count().await, 1);
    }

    #[tokio::test]
    async fn concurrent_registrations_have_one_winner() {
        let h = harness();
        let a = {
            let service = Arc::clone(&h.service);
            tokio::spawn(async move {
                service
                    .register(register_input("race@example.com", "pw1234"))
                    .await
            })
        };
        let b = {
            let service = Arc::clone(&h.service);
            tokio::spawn(async move {
                service
                    .register(register_input("race@example.com", "pw1234"))
                    .await
            })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let exists = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::UserExists)))
            .count();
        assert_eq!((ok, exists), (1, 1));
        assert_eq!(h.store.user_count().await, 1);
    }

    #[tokio::test]
    async fn register_fails_closed_on_store_error() {
        let service = AuthService::new(
            Arc::new(BrokenStore),
            fast_hasher(),
            signer(),
            Arc::new(RecordingMailer::default()),
        )
        .unwrap();

        let result = service
            .register(register_input("x@example.com", "pw1234"))
            .await;
        assert_matches!(result, Err(AuthError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let h = harness();
        let result = h.service.register(register_input("", "pw1234")).await;
        assert_matches!(result, Err(AuthError::Validation(_)));

        let result = h.service.register(register_input("a@example.com", "")).await;
        assert_matches!(result, Err(AuthError::Validation(_)));
        assert_eq!(h.store.user_count().await, 0);
    }

    #[tokio::test]
    async fn register_enforces_configured_minimum_length() {
        let store = Arc::new(InMemoryUserStore::new());
        let service = AuthService::new(
            store.clone(),
            fast_hasher(),
            signer(),
            Arc::new(RecordingMailer::default()),
        )
        .unwrap()
        .with_min_password_length(8);

        let result = service.register(register_input("short@example.com", "pw123")).await;
        assert_matches!(result, Err(AuthError::Validation(msg)) if msg.contains("at least 8"));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn mail_failure_does_not_fail_registration() {
        let h = harness_with(RecordingMailer::failing());
        let reg = h
            .service
            .register(register_input("nomail@example.com", "pw1234"))
            .await
            .unwrap();

        assert!(!reg.verification_email_sent);
        assert_eq!(h.store.tokens_for(reg.user_id).await.len(), 1);
    }

    #[tokio::test]
    async fn login_before_verification_is_email_not_verified() {
        let h = harness();
        h.service
            .register(register_input("unv@example.com", "pw1234"))
            .await
            .unwrap();

        let result = h.service.login(login_input("unv@example.com", "pw1234")).await;
        assert_matches!(result, Err(AuthError::EmailNotVerified));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let h = harness();
        h.service
            .register(register_input("known@example.com", "pw1234"))
            .await
            .unwrap();

        let unknown = h
            .service
            .login(login_input("ghost@example.com", "pw1234"))
            .await
            .unwrap_err();
        let wrong = h
            .service
            .login(login_input("known@example.com", "wrongpw"))
            .await
            .unwrap_err();

        assert_matches!(unknown, AuthError::InvalidCredentials);
        assert_matches!(wrong, AuthError::InvalidCredentials);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn login_on_broken_store_is_invalid_credentials() {
        let service = AuthService::new(
            Arc::new(BrokenStore),
            fast_hasher(),
            signer(),
            Arc::new(RecordingMailer::default()),
        )
        .unwrap();

        let result = service.login(login_input("a@example.com", "pw1234")).await;
        assert_matches!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn verification_token_is_single_use() {
        let h = harness();
        h.service
            .register(register_input("once@example.com", "pw1234"))
            .await
            .unwrap();
        let token = h.mailer.last_token_for("once@example.com");

        h.service.verify_email(&token).await.unwrap();
        let second = h.service.verify_email(&token).await;
        assert_matches!(second, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let h = harness();
        let random = generate_verification_token().plaintext;
        for token in ["", "deadbeef", random.as_str()] {
            let result = h.service.verify_email(token).await;
            assert_matches!(result, Err(AuthError::InvalidToken));
        }
    }

    #[tokio::test]
    async fn alice_full_lifecycle() {
        let h = harness();
        let reg = h
            .service
            .register(register_input("alice@example.com", "pw123"))
            .await
            .unwrap();

        let before = h.service.login(login_input("alice@example.com", "pw123")).await;
        assert_matches!(before, Err(AuthError::EmailNotVerified));

        let token = h.mailer.last_token_for("alice@example.com");
        h.service.verify_email(&token).await.unwrap();
        let alice = h.store.get_user_by_id(reg.user_id).await.unwrap();
        assert!(alice.is_verified);

        let outcome = h
            .service
            .login(login_input("alice@example.com", "pw123"))
            .await
            .unwrap();
        assert_eq!(outcome.user_id, reg.user_id);
        let claims = h
            .service
            .signer()
            .decode_claims(&outcome.session.token)
            .unwrap();
        assert_eq!(claims.sub, reg.user_id);
        assert_eq!(
            h.service.validate_session(&outcome.session.token).unwrap(),
            reg.user_id
        );

        let wrong = h.service.login(login_input("alice@example.com", "wrongpw")).await;
        assert_matches!(wrong, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn profile_hides_password_hash() {
        let h = harness();
        let reg = h
            .service
            .register(register_input("prof@example.com", "pw1234"))
            .await
            .unwrap();

        let profile = h.service.profile(reg.user_id).await.unwrap();
        assert_eq!(profile.email, "prof@example.com");
        assert!(!profile.is_verified);

        let missing = h.service.profile(Uuid::new_v4()).await;
        assert_matches!(missing, Err(AuthError::InvalidSession));
    }

    #[tokio::test]
    async fn garbage_session_is_invalid() {
        let h = harness();
        assert_matches!(
            h.service.validate_session("garbage"),
            Err(AuthError::InvalidSession)
        );
    }

    #[tokio::test]
    async fn failed_user_and_token_insert_leaves_no_account() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryUserStore::new(),
            fail_writes: std::sync::atomic::AtomicBool::new(true),
        });
        let service = AuthService::new(
            store.clone(),
            fast_hasher(),
            signer(),
            Arc::new(RecordingMailer::default()),
        )
        .unwrap();

        let first = service
            .register(register_input("stranded@example.com", "pw1234"))
            .await;
        assert_matches!(first, Err(AuthError::StoreUnavailable(_)));
        assert_eq!(store.inner.user_count().await, 0);

        // The email is still free once the store recovers.
        store
            .fail_writes
            .store(false, std::sync::atomic::Ordering::SeqCst);
        let retry = service
            .register(register_input("stranded@example.com", "pw1234"))
            .await
            .unwrap();
        assert_eq!(store.inner.user_count().await, 1);
        assert_eq!(store.inner.tokens_for(retry.user_id).await.len(), 1);
    }

    #[tokio::test]
    async fn slow_mailer_does_not_hold_registration() {
        let store = Arc::new(InMemoryUserStore::new());
        let service = AuthService::new(
            store.clone(),
            fast_hasher(),
            signer(),
            Arc::new(HangingMailer),
        )
        .unwrap()
        .with_mail_timeout(std::time::Duration::from_millis(50));

        let reg = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            service.register(register_input("slow@example.com", "pw1234")),
        )
        .await
        .expect("registration should not wait on the mailer")
        .unwrap();

        assert!(!reg.verification_email_sent);
        assert_eq!(store.user_count().await, 1);
        assert_eq!(store.tokens_for(reg.user_id).await.len(), 1);
    }

    #[tokio::test]
    async fn hashing_failure_creates_no_user() {
        let store = Arc::new(InMemoryUserStore::new());
        let hasher = RejectingHasher {
            inner: fast_argon2(),
            reject: "unhashable",
        };
        let service = AuthService::new(
            store.clone(),
            Arc::new(hasher),
            signer(),
            Arc::new(RecordingMailer::default()),
        )
        .unwrap();

        let result = service
            .register(register_input("hash@example.com", "unhashable"))
            .await;
        assert_matches!(result, Err(AuthError::Hashing(HashingError::Hash(_))));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn empty_password_rejected_at_zero_minimum() {
        let store = Arc::new(InMemoryUserStore::new());
        let service = AuthService::new(
            store.clone(),
            fast_hasher(),
            signer(),
            Arc::new(RecordingMailer::default()),
        )
        .unwrap()
        .with_min_password_length(0);

        let result = service.register(register_input("zero@example.com", "")).await;
        assert_matches!(result, Err(AuthError::Validation(_)));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn email_is_matched_exactly() {
        let h = harness();
        h.service
            .register(register_input("exact@example.com", "pw1234"))
            .await
            .unwrap();

        let padded = h
            .service
            .login(login_input(" exact@example.com", "pw1234"))
            .await;
        assert_matches!(padded, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn expired_session_is_reported_as_expired() {
        let h = harness();
        let issued = h
            .service
            .signer()
            .issue_at(Uuid::new_v4(), chrono::Utc::now() - Duration::days(8))
            .unwrap();

        assert_matches!(
            h.service.validate_session(&issued.token),
            Err(AuthError::SessionExpired)
        );
    }
}
