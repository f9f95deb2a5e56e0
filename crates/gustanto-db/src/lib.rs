//! # gustanto-db: Database Layer for Gustanto POS
//!
//! This crate provides ledger storage for the Gustanto POS backend.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Gustanto POS Data Flow                            │
//! │                                                                         │
//! │  HTTP handler (POST /order)        Summary scheduler (23:59)            │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    gustanto-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │    │    │
//! │  │   │               │    │ SaleRepo      │    │ 001_init     │    │    │
//! │  │   │ SqlitePool    │◄───│ ExpenseRepo   │    │ 002_indexes  │    │    │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     SQLite Database                             │    │
//! │  │                     ./gustanto_pos.db                           │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Sale and expense repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gustanto_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("gustanto_pos.db")).await?;
//!
//! let today = PeriodKey::Day(clock.today());
//! let sales = db.sales().total_for_period(&today).await?;
//! let expenses = db.expenses().total_for_period(&today).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::expense::ExpenseRepository;
pub use repository::sale::SaleRepository;
