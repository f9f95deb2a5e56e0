//! # gustanto-server: HTTP API for Gustanto POS
//!
//! The single backend process of a Gustanto deployment. Tills record sales
//! and expenses over HTTP, read daily and monthly reports, and arm the
//! end-of-day summary.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Gustanto POS Backend                            │
//! │                                                                         │
//! │   Till (browser)        Till (browser)        Till (browser)            │
//! │        │                      │                     │                   │
//! │        └──────────────────────┼─────────────────────┘                   │
//! │                               ▼  HTTP :5000                             │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 gustanto-server (THIS CRATE)                    │    │
//! │  │                                                                 │    │
//! │  │   routes ──► ledger ──► gustanto-db ──► SQLite                  │    │
//! │  │     │                        ▲                                  │    │
//! │  │     │ arm                    │ summarize                        │    │
//! │  │     ▼                        │                                  │    │
//! │  │   scheduler ─────────────────┘                                  │    │
//! │  │     │                                                           │    │
//! │  │     ▼                                                           │    │
//! │  │   notify (WhatsApp link / webhook)                              │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Layered server configuration
//! - [`clock`] - Source of local time
//! - [`error`] - `ApiError` and its HTTP mapping
//! - [`ledger`] - Period reports shared by routes and scheduler
//! - [`export`] - CSV rendering
//! - [`notify`] - Summary delivery channels
//! - [`scheduler`] - Daily summary state machine and loop
//! - [`routes`] - axum handlers
//! - [`state`] - Handler state

pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod notify;
pub mod routes;
pub mod scheduler;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use notify::{Notifier, NotifyError, SummaryChannel};
pub use routes::router;
pub use scheduler::{ArmOutcome, SchedulerHandle, SchedulerSettings, SummaryScheduler};
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info,gustanto=debug,sqlx=warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gustanto=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
