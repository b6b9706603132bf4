//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register  -> register
/// POST /login     -> login
/// GET  /verify    -> verify_email_link
/// POST /verify    -> verify_email
/// GET  /me        -> me (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route(
            "/verify",
            get(auth::verify_email_link).post(auth::verify_email),
        )
        .route("/me", get(auth::me))
}
