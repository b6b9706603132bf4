//! Row types for the `users` and `email_verifications` tables.

pub mod user;
pub mod verification;
