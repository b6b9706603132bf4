use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pravo_core::error::AuthError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`AuthError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An error from the auth core.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Missing or malformed `Authorization` header.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A request body or query string that does not parse.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- Auth core ---
            AppError::Auth(err) => classify_auth_error(err),

            // --- HTTP-specific errors ---
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map an [`AuthError`] to an HTTP status, error code, and message.
///
/// Domain outcomes are 4xx with the error's own message; infrastructure
/// failures are 500 with a sanitized message.
fn classify_auth_error(err: &AuthError) -> (StatusCode, &'static str, String) {
    let (status, code) = match err {
        AuthError::UserExists => (StatusCode::CONFLICT, "USER_EXISTS"),
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
        AuthError::EmailNotVerified => (StatusCode::FORBIDDEN, "EMAIL_NOT_VERIFIED"),
        AuthError::InvalidToken => (StatusCode::BAD_REQUEST, "INVALID_TOKEN"),
        AuthError::InvalidSession | AuthError::SessionExpired => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
        }
        AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        AuthError::Hashing(_) | AuthError::Signing(_) | AuthError::StoreUnavailable(_) => {
            tracing::error!(error = %err, "Internal auth error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            );
        }
    };
    (status, code, err.to_string())
}
