//! Liveness/readiness probe for load balancers.
//!
//! Every auth operation goes through the user store, so the service is only
//! ready when the store's database answers.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when the user store answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub store: StoreHealth,
}

#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub reachable: bool,
    /// Round-trip time of the probe query.
    pub latency_ms: u64,
}

/// GET /health
///
/// 200 when the user store is reachable, 503 when it is not, so an
/// instance that cannot authenticate anyone is taken out of rotation.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let probe = pravo_db::health_check(&state.pool).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    if let Err(e) = &probe {
        tracing::warn!(error = %e, "User store health probe failed");
    }
    let reachable = probe.is_ok();

    let (code, status) = if reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store: StoreHealth {
                reachable,
                latency_ms,
            },
        }),
    )
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
