pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/verify                   verify email, GET ?token= or POST body (public)
/// /auth/me                       current user (requires session token)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/auth", auth::router())
}
