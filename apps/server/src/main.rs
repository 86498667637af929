//! # Vape POS Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Startup                                                                │
//! │    1. init_tracing (RUST_LOG or default filter)                         │
//! │    2. ServerConfig::load (file → env overrides → validate)              │
//! │    3. Database::new (pool + migrations)                                 │
//! │    4. NotificationDispatcher::from_config (disabled without a token)    │
//! │    5. axum::serve until Ctrl+C / SIGTERM, then close the pool           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vape_db::{Database, DbConfig};
use vape_server::{build_router, AppState, NotificationDispatcher, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Vape POS server...");

    let config = ServerConfig::load().context("Failed to load configuration")?;
    let db_path = config.database_path()?;
    let addr = config.socket_addr()?;
    info!(
        addr = %addr,
        db = %db_path.display(),
        users = config.auth.users.len(),
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&db_path).max_connections(config.database.max_connections))
        .await
        .context("Failed to open database")?;

    let notifier = NotificationDispatcher::from_config(&config.telegram).context("Failed to build Telegram client")?;
    if !notifier.is_enabled() {
        warn!("Telegram bot token or chat id missing, reports will only be logged");
    }

    let state = AppState::new(db.clone(), config, notifier);
    let app = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vape=debug,sqlx=warn,tower_http=info"));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
