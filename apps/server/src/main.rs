//! # Gustanto POS Server
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Init tracing                                                        │
//! │  2. Load config (--config / GUSTANTO_CONFIG / platform dir, env)        │
//! │  3. Open SQLite, run migrations                                         │
//! │  4. Build notifier, spawn summary scheduler (arm if configured)         │
//! │  5. Bind, serve until Ctrl+C / SIGTERM                                  │
//! │  6. Stop scheduler, close pool                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```bash
//! gustanto-server
//! gustanto-server --config ./server.toml
//! GUSTANTO_PORT=8080 RUST_LOG=debug gustanto-server
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use gustanto_db::{Database, DbConfig};
use gustanto_server::{
    init_tracing, router, AppState, SchedulerSettings, ServerConfig, SummaryChannel,
    SummaryScheduler, SystemClock,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::load(config_arg()).context("Failed to load configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.bind_address(),
        db = %config.database.path.display(),
        channel = %config.notify.channel,
        "Starting Gustanto POS server"
    );

    let db = Database::new(
        DbConfig::new(&config.database.path).max_connections(config.database.max_connections),
    )
    .await
    .context("Failed to open database")?;

    let clock = Arc::new(SystemClock);
    let notifier =
        SummaryChannel::from_settings(&config.notify).context("Failed to set up notifier")?;

    let (scheduler, scheduler_handle) = SummaryScheduler::new(
        db.clone(),
        clock.clone(),
        notifier,
        SchedulerSettings::from_config(&config.summary, &config.notify),
    );
    let scheduler_task = tokio::spawn(scheduler.run());

    if config.summary.arm_on_startup {
        scheduler_handle.arm();
    }

    let state = AppState::new(db.clone(), clock, scheduler_handle.clone());
    let app = router(state);

    let bind_addr = config.server.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!(addr = %bind_addr, "Gustanto POS backend is live");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    scheduler_handle.shutdown().await;
    if let Err(e) = scheduler_task.await {
        tracing::warn!(error = %e, "Scheduler task ended abnormally");
    }
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// `--config <path>` / `-c <path>`, if given.
fn config_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => return args.next().map(PathBuf::from),
            other => {
                if let Some(path) = other.strip_prefix("--config=") {
                    return Some(PathBuf::from(path));
                }
            }
        }
    }
    None
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
