#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use pravo_api::app::build_app;
use pravo_api::config::ServerConfig;
use pravo_api::state::AppState;
use pravo_core::auth::AuthService;
use pravo_core::mail::{MailError, VerificationMailer};
use pravo_core::password::CredentialHasher;
use pravo_db::PgUserStore;
use sqlx::PgPool;
use tower::ServiceExt;

/// Records verification mails so tests can follow the link.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    /// The most recent token mailed to `email`.
    pub fn token_for(&self, email: &str) -> String {
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
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}

/// Build a test `ServerConfig` with safe defaults and a cheap hash cost.
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(|key| match key {
        "HOST" => Some("127.0.0.1".into()),
        "PORT" => Some("0".into()),
        "JWT_SECRET" => Some("integration-test-secret".into()),
        "PASSWORD_HASH_MEMORY_KIB" => Some("8".into()),
        "PASSWORD_HASH_ITERATIONS" => Some("1".into()),
        _ => None,
    })
    .unwrap()
}

/// A running app plus the mailer it sends verification links through.
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
}

/// Build the full application router with the production middleware stack
/// on top of the given database pool.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());

    let auth = AuthService::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(CredentialHasher::new(config.hasher).unwrap()),
        config.session.signer().unwrap(),
        mailer.clone(),
    )
    .unwrap()
    .with_min_password_length(config.min_password_length)
    .with_mail_timeout(config.mail_timeout());

    let state = AppState {
        pool,
        config: Arc::new(config),
        auth: Arc::new(auth),
    };

    TestApp {
        router: build_app(state).unwrap(),
        mailer,
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
