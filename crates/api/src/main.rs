use std::net::SocketAddr;
use std::sync::Arc;

use pravo_core::auth::AuthService;
use pravo_core::mail::VerificationMailer;
use pravo_core::password::CredentialHasher;
use pravo_db::PgUserStore;
use pravo_mail::{LogMailer, MailConfig, SmtpMailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pravo_api::app::build_app;
use pravo_api::config::ServerConfig;
use pravo_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pravo_api=debug,pravo_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = pravo_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    pravo_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    pravo_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Auth primitives ---
    let hasher = CredentialHasher::new(config.hasher).expect("Invalid password hashing parameters");
    let signer = config
        .session
        .signer()
        .expect("Invalid session signing configuration");

    // --- Mail ---
    let mailer: Arc<dyn VerificationMailer> = match MailConfig::from_env() {
        Some(mail_config) => {
            tracing::info!(smtp_host = %mail_config.smtp_host, "SMTP mailer configured");
            Arc::new(SmtpMailer::new(mail_config).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, verification emails will not be sent");
            Arc::new(LogMailer)
        }
    };

    // --- Auth service ---
    let store = Arc::new(PgUserStore::new(pool.clone()));
    let auth = AuthService::new(store, Arc::new(hasher), signer, mailer)
        .expect("Failed to initialise auth service")
        .with_min_password_length(config.min_password_length)
        .with_mail_timeout(config.mail_timeout());

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        auth: Arc::new(auth),
    };

    let app = build_app(state).expect("Invalid CORS configuration");

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
