use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod models;
mod shortener;
mod store;

use shortener::Shortener;
use store::{SqliteStore, Store};

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    /// Pair store shared by every request; the redirect path reads it directly.
    pub store: Arc<dyn Store>,
    pub shortener: Shortener,
    pub config: config::AppConfig,
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snaplink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting snaplink on {}", config.bind_addr());

    // Open the SQLite pool and make sure the schema exists. Either failing is fatal.
    let sqlite = SqliteStore::connect(&config).await?;
    tracing::info!("Database connection verified: {}", config.database_url);

    sqlite.ensure_schema().await?;
    tracing::info!("Database schema ready");

    let store: Arc<dyn Store> = Arc::new(sqlite.clone());
    let state = Arc::new(AppState {
        shortener: Shortener::new(Arc::clone(&store)),
        store,
        config,
    });

    let listener = tokio::net::TcpListener::bind(state.config.bind_addr()).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let app = handlers::router(state);

    // ── Serve ──────────────────────────────────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down server...");
    sqlite.close().await;
    tracing::info!("Database connection closed");

    Ok(())
}

/// Resolve on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
