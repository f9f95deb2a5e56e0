//! # Periods and Timestamps
//!
//! How ledger records are bucketed into days and months.
//!
//! ## The Filtering Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Timestamps are stored as local ISO-8601 text, verbatim:                │
//! │                                                                         │
//! │      2024-05-01T10:00:00.000000                                         │
//! │      └──┬──┘                                                            │
//! │      ───┴─── month key  "2024-05"     (first 7 chars)                   │
//! │      └────┬────┘                                                        │
//! │      ─────┴───── day key "2024-05-01" (first 10 chars)                  │
//! │                                                                         │
//! │  A record belongs to a period when its timestamp STARTS WITH the        │
//! │  period key. No parsing, no timezone conversion, no normalization.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The database layer applies the same rule in SQL with
//! `substr(timestamp, 1, length(key)) = key`.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, ValidationError};

/// Format used for timestamps generated by the server.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Formats a local date-time the way the ledger stores it.
///
/// ```rust
/// use chrono::NaiveDate;
/// use gustanto_core::period::format_timestamp;
///
/// let at = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// assert_eq!(format_timestamp(at), "2024-05-01T10:00:00.000000");
/// ```
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Returns the day key (`YYYY-MM-DD`) of a stored timestamp.
///
/// Falls back to the whole string for timestamps shorter than a date,
/// which only legacy rows can have.
pub fn day_key(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

// =============================================================================
// Year-Month
// =============================================================================

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a year-month, or `None` if the month is not 1-12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        // Round-trip through NaiveDate so the year is in chrono's range too
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| YearMonth { year, month })
    }

    /// The month a date falls in.
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Parses exactly `YYYY-MM`.
///
/// ```rust
/// use gustanto_core::period::YearMonth;
///
/// let may: YearMonth = "2024-05".parse().unwrap();
/// assert_eq!(may.month(), 5);
/// assert!("2024-13".parse::<YearMonth>().is_err());
/// assert!("2024-5".parse::<YearMonth>().is_err());
/// ```
impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::invalid_format("filter", "expected YYYY-MM");

        let s = s.trim();
        if s.len() != 7 || s.as_bytes()[4] != b'-' {
            return Err(invalid());
        }

        let date = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map_err(|_| invalid())?;

        Ok(YearMonth::of(date))
    }
}

// =============================================================================
// Period Key
// =============================================================================

/// A reporting period: one calendar day or one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKey {
    Day(NaiveDate),
    Month(YearMonth),
}

impl PeriodKey {
    /// The timestamp prefix that selects this period.
    pub fn prefix(&self) -> String {
        match self {
            PeriodKey::Day(date) => date.format("%Y-%m-%d").to_string(),
            PeriodKey::Month(month) => month.to_string(),
        }
    }

    /// Whether a stored timestamp falls in this period.
    pub fn contains(&self, timestamp: &str) -> bool {
        timestamp.starts_with(&self.prefix())
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

// =============================================================================
// Export Period
// =============================================================================

/// The periods `GET /export/{period}` understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPeriod {
    Today,
    Month,
}

impl ExportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportPeriod::Today => "today",
            ExportPeriod::Month => "month",
        }
    }

    /// Resolves to a concrete period relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> PeriodKey {
        match self {
            ExportPeriod::Today => PeriodKey::Day(today),
            ExportPeriod::Month => PeriodKey::Month(YearMonth::of(today)),
        }
    }
}

impl FromStr for ExportPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(ExportPeriod::Today),
            "month" => Ok(ExportPeriod::Month),
            other => Err(CoreError::UnknownPeriod(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_month_parsing() {
        let ym: YearMonth = "2024-05".parse().unwrap();
        assert_eq!((ym.year(), ym.month()), (2024, 5));
        assert_eq!(ym.to_string(), "2024-05");

        assert!("2024-00".parse::<YearMonth>().is_err());
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("2024/05".parse::<YearMonth>().is_err());
        assert!("24-05".parse::<YearMonth>().is_err());
        assert!("2024-05-01".parse::<YearMonth>().is_err());
        assert!("".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_year_month_new() {
        assert!(YearMonth::new(2024, 12).is_some());
        assert!(YearMonth::new(2024, 0).is_none());
        assert_eq!(YearMonth::of(date(2024, 2, 29)).to_string(), "2024-02");
    }

    #[test]
    fn test_period_prefix_and_contains() {
        let day = PeriodKey::Day(date(2024, 5, 1));
        assert_eq!(day.prefix(), "2024-05-01");
        assert!(day.contains("2024-05-01T10:00:00"));
        assert!(day.contains("2024-05-01 23:59:59"));
        assert!(!day.contains("2024-05-10T10:00:00"));

        let month = PeriodKey::Month(YearMonth::new(2024, 5).unwrap());
        assert_eq!(month.prefix(), "2024-05");
        assert!(month.contains("2024-05-31T23:59:59"));
        assert!(!month.contains("2024-06-01T00:00:00"));
    }

    #[test]
    fn test_day_key() {
        assert_eq!(day_key("2024-05-01T10:00:00.123456"), "2024-05-01");
        assert_eq!(day_key("2024-05"), "2024-05");
    }

    #[test]
    fn test_export_period() {
        assert_eq!("today".parse::<ExportPeriod>().unwrap(), ExportPeriod::Today);
        assert_eq!("month".parse::<ExportPeriod>().unwrap(), ExportPeriod::Month);
        assert!(matches!(
            "week".parse::<ExportPeriod>(),
            Err(CoreError::UnknownPeriod(p)) if p == "week"
        ));

        let today = date(2024, 5, 17);
        assert_eq!(ExportPeriod::Today.resolve(today).prefix(), "2024-05-17");
        assert_eq!(ExportPeriod::Month.resolve(today).prefix(), "2024-05");
    }

    #[test]
    fn test_format_timestamp_keeps_microseconds() {
        let at = date(2024, 5, 1)
            .and_hms_micro_opt(9, 5, 7, 42)
            .unwrap();
        assert_eq!(format_timestamp(at), "2024-05-01T09:05:07.000042");
    }
}
