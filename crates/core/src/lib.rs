//! Account-management core.
//!
//! Owns the authentication state machine (registration, login, email
//! verification) and the primitives it is built from. Persistence and mail
//! delivery are reached only through the [`store::UserStore`] and
//! [`mail::VerificationMailer`] traits so that the HTTP layer, the Postgres
//! store, and the SMTP mailer live in their own crates.
//!
//! - [`password`] -- Argon2id credential hashing and verification.
//! - [`session`] -- HS256 session-token issuance and validation.
//! - [`verification`] -- one-time email verification tokens.
//! - [`store`] -- the user store contract and an in-memory implementation.
//! - [`auth`] -- the [`auth::AuthService`] orchestrating all of the above.

pub mod auth;
pub mod error;
pub mod mail;
pub mod password;
pub mod session;
pub mod store;
pub mod types;
pub mod user;
pub mod verification;
