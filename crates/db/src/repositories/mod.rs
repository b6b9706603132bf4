//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod user_repo;
pub mod verification_repo;

pub use user_repo::UserRepo;
pub use verification_repo::VerificationTokenRepo;
