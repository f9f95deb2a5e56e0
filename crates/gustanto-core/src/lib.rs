//! # gustanto-core: Pure Business Logic for Gustanto POS
//!
//! Everything the daily tally knows about sales, expenses and summaries,
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Gustanto POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 apps/server (HTTP + scheduler)                  │    │
//! │  │     /order  /expense  /sales/*  /export  /chart  /schedule      │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │              ★ gustanto-core (THIS CRATE) ★                     │    │
//! │  │                                                                 │    │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │    │
//! │  │   │  types   │ │  period  │ │ summary  │ │  digest  │          │    │
//! │  │   │  Sale    │ │ PeriodKey│ │ totals   │ │ message  │          │    │
//! │  │   │  Expense │ │ YearMonth│ │ per-day  │ │ SendTime │          │    │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                  │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                  gustanto-db (Database Layer)                   │    │
//! │  │             SQLite queries, migrations, repositories            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Ledger records and validated insert payloads
//! - [`money`] - Integer money
//! - [`period`] - Day and month keys, the prefix filtering contract
//! - [`summary`] - Period totals and the per-day chart
//! - [`digest`] - Daily summary message and next-fire math
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use gustanto_core::{DigestFormat, Money, PeriodKey, PeriodSummary};
//!
//! let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! let summary = PeriodSummary::new(
//!     &PeriodKey::Day(day),
//!     Money::from_minor(150),
//!     Money::from_minor(50),
//! );
//!
//! let message = DigestFormat::default().render(day, &summary);
//! assert!(message.contains("Net Profit: ₹100"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod digest;
pub mod error;
pub mod money;
pub mod period;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use digest::{next_fire_after, DigestFormat, SendTime};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use period::{ExportPeriod, PeriodKey, YearMonth};
pub use summary::{daily_breakdown, DailyBreakdown, PeriodSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items in one order.
///
/// A till submits one customer's basket; anything bigger is a client bug.
pub const MAX_ORDER_LINES: usize = 500;

/// Maximum length of an item name, in characters.
pub const MAX_ITEM_NAME_LEN: usize = 200;

/// Maximum length of an expense description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Largest accepted price or expense amount, in minor units.
///
/// Ten million rupees per row keeps any realistic ledger's sums well inside `i64`.
pub const MAX_PRICE: i64 = 1_000_000_000;
