//! # Schedule Routes
//!
//! Tills call these after login. Arming is idempotent, so every till can
//! call on every login without stacking up daily sends.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::scheduler::{ArmOutcome, SchedulerStatus};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub status: String,
    pub send_at: String,
    pub next_fire: NaiveDateTime,
    pub already_armed: bool,
}

impl ScheduleResponse {
    fn new(status: String, send_at: String, outcome: ArmOutcome) -> Self {
        ScheduleResponse {
            status,
            send_at,
            next_fire: outcome.next_fire(),
            already_armed: outcome.already_armed(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schedule-summary", post(schedule_summary).get(schedule_status))
        .route("/trigger-schedule-on-login", post(trigger_on_login))
}

/// `POST /schedule-summary`
async fn schedule_summary(State(state): State<AppState>) -> Json<ScheduleResponse> {
    let outcome = state.scheduler.arm();
    let send_at = state.scheduler.send_at().to_string();

    Json(ScheduleResponse::new(
        format!("Scheduled daily WhatsApp summary at {}", send_at),
        send_at,
        outcome,
    ))
}

/// `POST /trigger-schedule-on-login`
async fn trigger_on_login(State(state): State<AppState>) -> Json<ScheduleResponse> {
    let outcome = state.scheduler.arm();

    Json(ScheduleResponse::new(
        "Scheduler re-triggered on login".to_string(),
        state.scheduler.send_at().to_string(),
        outcome,
    ))
}

/// `GET /schedule-summary`
async fn schedule_status(State(state): State<AppState>) -> Json<SchedulerStatus> {
    Json(state.scheduler.status())
}
