//! BookPath Server: authentication and session core.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use bookpath_api::{AppState, build_app};
use bookpath_cache::provider::CacheManager;
use bookpath_core::config::AppConfig;
use bookpath_core::error::AppError;
use bookpath_database::{CredentialStore, DatabasePool, UserRepository};

#[tokio::main]
async fn main() {
    let env = std::env::var("BOOKPATH_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Starting BookPath"
    );

    // ── Step 1: Credential store + migrations ────────────────────
    let db_pool = DatabasePool::connect(&config.database).await?;
    bookpath_database::migration::run_migrations(db_pool.pool()).await?;

    // ── Step 2: Ephemeral store ──────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // ── Step 3: Auth core + HTTP state ───────────────────────────
    let store: Arc<dyn CredentialStore> = Arc::new(UserRepository::new(
        db_pool.pool().clone(),
        Duration::from_millis(config.database.operation_timeout_ms),
    ));
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let bind_address = config.server.bind_address();
    let state = AppState::new(config, store, cache)?;
    let app = build_app(state);

    // ── Step 4: Serve until a shutdown signal ────────────────────
    let listener = TcpListener::bind(bind_address.as_str()).await?;
    tracing::info!(address = %bind_address, "HTTP server listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
            })
            .await
    });

    let result = tokio::select! {
        joined = &mut server => joined,
        () = shutdown_signal() => {
            tracing::info!(grace_seconds = grace.as_secs(), "Shutdown signal received, draining requests");
            let _ = shutdown_tx.send(true);
            match tokio::time::timeout(grace, &mut server).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!("Graceful shutdown timed out; aborting open connections");
                    server.abort();
                    Ok(Ok(()))
                }
            }
        }
    };

    // ── Step 5: Release store handles ────────────────────────────
    db_pool.close().await;
    tracing::info!("BookPath stopped");

    match result {
        Ok(served) => served.map_err(AppError::from),
        Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
