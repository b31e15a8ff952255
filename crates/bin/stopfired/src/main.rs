//! # stopfired — stopfire daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`stopfire.toml` plus environment overrides)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use stopfire_adapter_http_axum::auth::TokenVerifier;
use stopfire_adapter_http_axum::state::AppState;
use stopfire_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteAlertSource, SqliteDeviceRepository, SqliteUserRepository,
};
use stopfire_app::services::alert_service::AlertService;
use stopfire_app::services::device_service::DeviceService;
use stopfire_app::services::ownership_service::OwnershipService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("opening database")?;
    let pool = db.pool().clone();

    // Services
    let ownership_service = OwnershipService::new(
        SqliteDeviceRepository::new(pool.clone()),
        SqliteUserRepository::new(pool.clone()),
    );
    let alert_service = AlertService::new(SqliteAlertSource::new(pool.clone()));
    let device_service = DeviceService::new(SqliteDeviceRepository::new(pool));

    // HTTP
    let state = AppState::new(
        ownership_service,
        alert_service,
        device_service,
        TokenVerifier::new(config.auth.jwt_secret.as_bytes()),
    );
    let app = stopfire_adapter_http_axum::router::build(state, config.request_timeout());

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(%bind_addr, "stopfired listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    tracing::info!("stopfired stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = wait_for("ctrl-c", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<_, std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

/// Resolve once `signal` is received. A listener that failed to install
/// never resolves, so it cannot trigger a shutdown.
async fn wait_for(name: &str, signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(err) = signal.await {
        tracing::error!(error = %err, signal = name, "failed to listen for signal");
        std::future::pending::<()>().await;
    }
}
