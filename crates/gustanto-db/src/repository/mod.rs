//! # Repository Module
//!
//! Database repository implementations for the ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler / scheduler                                               │
//! │       │                                                                 │
//! │       │  db.sales().total_for_period(&PeriodKey::Day(today))            │
//! │       ▼                                                                 │
//! │  SaleRepository                       ExpenseRepository                 │
//! │  ├── record_order(&NewOrder)          ├── insert(&NewExpense)           │
//! │  ├── insert(&NewSale)                 ├── list_for_period(&PeriodKey)   │
//! │  ├── list_all()                       └── total_for_period(&PeriodKey)  │
//! │  ├── list_for_period(&PeriodKey)                                        │
//! │  └── total_for_period(&PeriodKey)                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Period Filtering
//! Both repositories select a period with the same predicate:
//! a row belongs to the period when its timestamp starts with
//! [`PeriodKey::prefix`](gustanto_core::PeriodKey::prefix).
//!
//! Legacy rows may hold NULLs; reads coalesce them to empty/zero.

pub mod expense;
pub mod sale;

/// Binds the period prefix as `?1`.
pub(crate) const PERIOD_FILTER: &str = "substr(timestamp, 1, length(?1)) = ?1";
