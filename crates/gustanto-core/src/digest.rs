//! # Daily Digest
//!
//! The end-of-day summary message and the math for when it goes out.
//!
//! ## Message Layout
//! ```text
//! *Gustanto Daily Summary - 2024-05-01*
//! Sales: ₹150
//! Expenses: ₹50
//! Net Profit: ₹100
//! ```
//!
//! The surrounding asterisks render as bold in WhatsApp.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::summary::PeriodSummary;

// =============================================================================
// Send Time
// =============================================================================

/// Wall-clock time of day the digest is sent, written `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SendTime(NaiveTime);

impl SendTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(SendTime)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl Default for SendTime {
    /// 23:59, one minute before the day rolls over.
    fn default() -> Self {
        SendTime(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl fmt::Display for SendTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for SendTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 5 {
            return Err(ValidationError::invalid_format("send_at", "expected HH:MM"));
        }

        NaiveTime::parse_from_str(s, "%H:%M")
            .map(SendTime)
            .map_err(|_| ValidationError::invalid_format("send_at", "expected HH:MM"))
    }
}

impl TryFrom<String> for SendTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SendTime> for String {
    fn from(value: SendTime) -> Self {
        value.to_string()
    }
}

/// The next time `at` occurs strictly after `now`.
///
/// ```text
///   now 10:00, at 23:59  →  today 23:59
///   now 23:59, at 23:59  →  tomorrow 23:59   (strictly after)
///   now 23:59:30         →  tomorrow 23:59
/// ```
pub fn next_fire_after(now: NaiveDateTime, at: SendTime) -> NaiveDateTime {
    let today = now.date().and_time(at.time());
    if today > now {
        return today;
    }

    today
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDateTime::MAX)
}

// =============================================================================
// Message Format
// =============================================================================

/// Renders the digest message for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestFormat {
    store_name: String,
    currency_symbol: String,
}

impl DigestFormat {
    pub fn new(store_name: impl Into<String>, currency_symbol: impl Into<String>) -> Self {
        DigestFormat {
            store_name: store_name.into(),
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn render(&self, date: NaiveDate, summary: &PeriodSummary) -> String {
        let c = &self.currency_symbol;
        format!(
            "*{} Daily Summary - {}*\nSales: {}{}\nExpenses: {}{}\nNet Profit: {}{}",
            self.store_name,
            date.format("%Y-%m-%d"),
            c,
            summary.total_sales(),
            c,
            summary.total_expenses(),
            c,
            summary.net_profit(),
        )
    }
}

impl Default for DigestFormat {
    fn default() -> Self {
        DigestFormat::new("Gustanto", "₹")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
