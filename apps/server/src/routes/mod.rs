//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Route                           Module     Purpose                     │
//! │  ─────────────────────────────── ────────── ─────────────────────────── │
//! │  GET  /                          mod        liveness banner             │
//! │  GET  /health                    mod        database + scheduler        │
//! │  POST /order                     ledger     multi-line sale             │
//! │  POST /expense                   ledger     one expense                 │
//! │  GET  /sales                     ledger     every sale, newest first    │
//! │  POST /sales                     ledger     one sale row                │
//! │  GET  /sales/today               reports    today's rows + totals       │
//! │  GET  /sales/month?filter=       reports    a month's rows + totals     │
//! │  GET  /export/{period}           reports    CSV download                │
//! │  GET  /chart/month?filter=       reports    per-day breakdown           │
//! │  POST /schedule-summary          schedule   arm daily summary           │
//! │  GET  /schedule-summary          schedule   scheduler status            │
//! │  POST /trigger-schedule-on-login schedule   arm, login flavour          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every route answers with permissive CORS headers and is traced by
//! `TraceLayer`.

pub mod ledger;
pub mod reports;
pub mod schedule;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{extract::State, Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::scheduler::SchedulerStatus;
use crate::state::AppState;

/// Body of `GET /`.
pub const BANNER: &str = "Gustanto POS backend is live";

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .merge(ledger::routes())
        .merge(reports::routes())
        .merge(schedule::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn banner() -> &'static str {
    BANNER
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    database: bool,
    scheduler: SchedulerStatus,
}

/// Health check endpoint. 503 when the database does not answer.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.health_check().await;
    let (status, code) = if database {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let body = HealthResponse {
        status,
        database,
        scheduler: state.scheduler.status(),
    };
    (code, Json(body))
}
