//! # Application State
//!
//! Shared by every handler through axum's `State` extractor.
//!
//! ```text
//! AppState (Clone, cheap)
//! ├── db:        Database         SQLite pool, repositories
//! ├── clock:     Arc<dyn Clock>   "now" for default timestamps and periods
//! └── scheduler: SchedulerHandle  arm / status
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use gustanto_db::Database;
use std::sync::Arc;

use crate::clock::Clock;
use crate::scheduler::SchedulerHandle;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub clock: Arc<dyn Clock>,
    pub scheduler: SchedulerHandle,
}

impl AppState {
    pub fn new(db: Database, clock: Arc<dyn Clock>, scheduler: SchedulerHandle) -> Self {
        AppState {
            db,
            clock,
            scheduler,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
