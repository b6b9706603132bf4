//! Handlers for the `/auth` resource (register, login, verify, me).

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use pravo_core::auth::{LoginInput, RegisterInput};
use pravo_core::types::{Timestamp, UserId};
use pravo_core::user::UserResponse;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Response body for `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub verification_email_sent: bool,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: Timestamp,
}

/// Query string (`GET`) or body (`POST`) for `/auth/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an unverified account and send the verification link. Returns 201
/// even when the email could not be sent; `verification_email_sent` says so.
/// Surrounding whitespace is stripped from email and name before they reach
/// the auth core, which matches emails exactly.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<RegisterResponse>>)> {
    let Json(input) = payload?;
    let registration = state
        .auth
        .register(RegisterInput {
            email: input.email.trim().to_string(),
            name: input.name.trim().to_string(),
            password: input.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegisterResponse {
                user_id: registration.user_id,
                verification_email_sent: registration.verification_email_sent,
            },
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns a session token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let Json(input) = payload?;
    let outcome = state
        .auth
        .login(LoginInput {
            email: input.email.trim().to_string(),
            password: input.password,
        })
        .await?;

    Ok(Json(DataResponse {
        data: LoginResponse {
            user_id: outcome.user_id,
            token: outcome.session.token,
            expires_at: outcome.session.expires_at,
        },
    }))
}

/// GET /api/v1/auth/verify?token=...
///
/// Target of the link in the verification email.
pub async fn verify_email_link(
    State(state): State<AppState>,
    query: Result<Query<VerifyRequest>, QueryRejection>,
) -> AppResult<Json<DataResponse<VerifyResponse>>> {
    let Query(input) = query?;
    verify(&state, &input.token).await
}

/// POST /api/v1/auth/verify
pub async fn verify_email(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<VerifyResponse>>> {
    let Json(input) = payload?;
    verify(&state, &input.token).await
}

/// GET /api/v1/auth/me
///
/// Profile of the user the bearer session token belongs to.
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let profile = state.auth.profile(auth_user.user_id).await?;
    Ok(Json(DataResponse { data: profile }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn verify(state: &AppState, token: &str) -> AppResult<Json<DataResponse<VerifyResponse>>> {
    state.auth.verify_email(token).await?;
    Ok(Json(DataResponse {
        data: VerifyResponse { verified: true },
    }))
}
