//! # Daily Summary Scheduler
//!
//! Sends the end-of-day summary once per day at the configured time.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐   arm()    ┌──────────┐   arm()  (no-op, AlreadyArmed)   │
//! │   │ UNARMED  │ ─────────► │  ARMED   │ ◄─────┐                          │
//! │   └──────────┘            └────┬─────┘ ──────┘                          │
//! │        ▲                       │ tick: now >= next_fire                 │
//! │        │                       ▼                                        │
//! │        │              advance next_fire past now                        │
//! │        │              summarize the due day                             │
//! │        │              send (bounded by notify deadline)                 │
//! │        │                       │                                        │
//! │        │                       └──► stays ARMED                         │
//! │        │                                                                │
//! │   process start                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Processing Loop
//! ```text
//! loop {
//!     select! {
//!         interval.tick()     => select! {
//!                                    tick(): fire if due
//!                                    shutdown_rx.recv() => break
//!                                }
//!         shutdown_rx.recv() => break
//!     }
//! }
//! ```
//!
//! `next_fire` moves forward before the message is sent, so a slow or
//! failing channel can never cause a second send for the same day, and a
//! process that slept through several days fires once, not once per day.

use chrono::{NaiveDate, NaiveDateTime};
use gustanto_core::{next_fire_after, DigestFormat, PeriodKey, SendTime};
use gustanto_db::Database;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::config::{NotifySettings, SummarySettings};
use crate::ledger;
use crate::notify::{Notifier, NotifyError, NotifyResult};

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Local time-of-day of the daily fire.
    pub send_at: SendTime,

    /// How often the loop checks whether it is due.
    pub tick_interval: Duration,

    /// Upper bound on one delivery, retries included.
    pub notify_deadline: Duration,

    pub format: DigestFormat,
}

impl SchedulerSettings {
    pub fn from_config(summary: &SummarySettings, notify: &NotifySettings) -> Self {
        SchedulerSettings {
            send_at: summary.send_at,
            tick_interval: summary.tick_interval(),
            notify_deadline: notify.deadline(),
            format: summary.digest_format(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        SchedulerSettings {
            send_at: SendTime::default(),
            tick_interval: Duration::from_secs(60),
            notify_deadline: Duration::from_secs(40),
            format: DigestFormat::default(),
        }
    }
}

// =============================================================================
// Shared State
// =============================================================================

#[derive(Debug, Default)]
struct ScheduleState {
    armed: bool,
    next_fire: Option<NaiveDateTime>,
    last_fired: Option<NaiveDate>,
}

/// State seen by both the loop and every handle.
struct Shared {
    state: Mutex<ScheduleState>,
    clock: Arc<dyn Clock>,
    send_at: SendTime,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ScheduleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Result of an arm request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// The scheduler was idle and is now armed.
    Armed { next_fire: NaiveDateTime },

    /// It was already armed; nothing changed.
    AlreadyArmed { next_fire: NaiveDateTime },
}

impl ArmOutcome {
    pub fn next_fire(&self) -> NaiveDateTime {
        match self {
            ArmOutcome::Armed { next_fire } | ArmOutcome::AlreadyArmed { next_fire } => *next_fire,
        }
    }

    pub fn already_armed(&self) -> bool {
        matches!(self, ArmOutcome::AlreadyArmed { .. })
    }
}

/// Snapshot for `GET /schedule-summary` and `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerStatus {
    pub armed: bool,
    pub send_at: String,
    pub next_fire: Option<NaiveDateTime>,
    pub last_fired: Option<NaiveDate>,
}

// =============================================================================
// Handle
// =============================================================================

/// Handle for controlling the scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Arc<Shared>,

    /// Shutdown sender.
    shutdown_tx: mpsc::Sender<()>,
}

impl SchedulerHandle {
    /// Arms the daily send. Repeated calls keep the existing schedule.
    pub fn arm(&self) -> ArmOutcome {
        let now = self.shared.clock.now();
        let mut state = self.shared.lock();

        if let (true, Some(next_fire)) = (state.armed, state.next_fire) {
            debug!(%next_fire, "Scheduler already armed");
            return ArmOutcome::AlreadyArmed { next_fire };
        }

        let next_fire = next_fire_after(now, self.shared.send_at);
        state.armed = true;
        state.next_fire = Some(next_fire);

        info!(send_at = %self.shared.send_at, %next_fire, "Daily summary armed");
        ArmOutcome::Armed { next_fire }
    }

    pub fn status(&self) -> SchedulerStatus {
        let state = self.shared.lock();
        SchedulerStatus {
            armed: state.armed,
            send_at: self.shared.send_at.to_string(),
            next_fire: state.next_fire,
            last_fired: state.last_fired,
        }
    }

    pub fn send_at(&self) -> SendTime {
        self.shared.send_at
    }

    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) {
        if self.shutdown_tx.send(()).await.is_err() {
            debug!("Scheduler already stopped");
        }
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Background task that fires the daily summary.
pub struct SummaryScheduler<N> {
    summarizer: Summarizer<N>,

    /// Shutdown receiver.
    shutdown_rx: mpsc::Receiver<()>,
}

/// Everything a fire needs. Kept apart from the shutdown receiver so the
/// loop can wait on both at once.
struct Summarizer<N> {
    db: Database,
    notifier: N,
    settings: SchedulerSettings,
    shared: Arc<Shared>,
}

impl<N: Notifier> SummaryScheduler<N> {
    /// Creates an unarmed scheduler and returns a handle.
    pub fn new(
        db: Database,
        clock: Arc<dyn Clock>,
        notifier: N,
        settings: SchedulerSettings,
    ) -> (Self, SchedulerHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let shared = Arc::new(Shared {
            state: Mutex::new(ScheduleState::default()),
            clock,
            send_at: settings.send_at,
        });

        let scheduler = SummaryScheduler {
            summarizer: Summarizer {
                db,
                notifier,
                settings,
                shared: shared.clone(),
            },
            shutdown_rx,
        };

        let handle = SchedulerHandle {
            shared,
            shutdown_tx,
        };

        (scheduler, handle)
    }

    /// Runs the scheduler loop.
    ///
    /// This should be spawned as a background task. Shutdown also cancels a
    /// fire in progress; that day's summary is then not sent, since its
    /// `next_fire` was already advanced.
    pub async fn run(mut self) {
        let settings = &self.summarizer.settings;
        info!(send_at = %settings.send_at, "Summary scheduler starting");

        let mut interval = tokio::time::interval(settings.tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tokio::select! {
                        _ = self.summarizer.tick() => {}
                        _ = self.shutdown_rx.recv() => {
                            info!("Summary scheduler shutting down, abandoning send in progress");
                            break;
                        }
                    }
                }

                // Shutdown (or every handle dropped)
                _ = self.shutdown_rx.recv() => {
                    info!("Summary scheduler shutting down");
                    break;
                }
            }
        }

        info!("Summary scheduler stopped");
    }

    /// Fires if armed and due. Returns the day that was summarized.
    pub async fn tick(&self) -> Option<NaiveDate> {
        self.summarizer.tick().await
    }
}

impl<N: Notifier> Summarizer<N> {
    async fn tick(&self) -> Option<NaiveDate> {
        let day = self.take_due()?;
        self.fire(day).await;
        Some(day)
    }

    /// Claims the pending fire, moving `next_fire` past now.
    fn take_due(&self) -> Option<NaiveDate> {
        let now = self.shared.clock.now();
        let mut state = self.shared.lock();

        let due = match state.next_fire {
            Some(next_fire) if state.armed && now >= next_fire => next_fire,
            _ => return None,
        };

        let next_fire = next_fire_after(now, self.settings.send_at);
        state.next_fire = Some(next_fire);
        state.last_fired = Some(due.date());

        debug!(due = %due, %next_fire, "Summary due");
        Some(due.date())
    }

    async fn fire(&self, day: NaiveDate) {
        let summary = match ledger::summarize(&self.db, &PeriodKey::Day(day)).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(%day, error = %e, "Failed to compute daily summary, skipping");
                return;
            }
        };

        let message = self.settings.format.render(day, &summary);

        match deliver(&self.notifier, &message, self.settings.notify_deadline).await {
            Ok(()) => info!(%day, net_profit = %summary.net_profit(), "Daily summary sent"),
            Err(e) => error!(%day, error = %e, "Failed to send daily summary"),
        }
    }
}

/// Sends one message, giving up after `deadline`.
pub async fn deliver<N: Notifier>(
    notifier: &N,
    message: &str,
    deadline: Duration,
) -> NotifyResult<()> {
    tokio::time::timeout(deadline, notifier.send(message))
        .await
        .map_err(|_| NotifyError::Timeout(deadline))?
}
