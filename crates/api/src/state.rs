use std::sync::Arc;

use pravo_core::auth::AuthService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks only; auth goes through `auth`).
    pub pool: pravo_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The registration / login / verification state machine.
    pub auth: Arc<AuthService>,
}
