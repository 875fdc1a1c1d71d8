use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apna_api::bootstrap::{ensure_bootstrap_user, BootstrapUser};
use apna_api::config::ServerConfig;
use apna_api::mail::OtpMailer;
use apna_api::router::build_app_router;
use apna_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apna_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = apna_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    apna_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    apna_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Bootstrap user ---
    if let Some(seed) = BootstrapUser::from_env() {
        ensure_bootstrap_user(&pool, &seed, config.phone_region)
            .await
            .expect("Failed to create bootstrap user");
    }

    // --- OTP mailer ---
    let mailer = match config.mail.clone() {
        Some(mail) => {
            tracing::info!(smtp_host = %mail.smtp_host, "OTP email delivery enabled");
            Some(Arc::new(OtpMailer::new(mail)))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, OTP codes will not be delivered");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        mailer,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let shutdown = CancellationToken::new();
    let server_shutdown = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(server_shutdown.cancelled_owned())
            .await
    });

    tokio::select! {
        result = &mut server => {
            // The server only returns on its own when it fails.
            match result {
                Ok(Err(e)) => tracing::error!(error = %e, "Server error"),
                Err(e) => tracing::error!(error = %e, "Server task failed"),
                Ok(Ok(())) => {}
            }
        }
        () = shutdown_signal() => shutdown.cancel(),
    }

    if shutdown.is_cancelled() {
        let grace = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(grace, &mut server).await.is_err() {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "Shutdown grace period elapsed, aborting in-flight requests"
            );
            server.abort();
        } else {
            tracing::info!("In-flight requests drained");
        }
    }

    // --- Post-shutdown cleanup ---
    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
