//! # Expense Repository
//!
//! Database operations for recorded expenses.

use sqlx::SqlitePool;
use tracing::debug;

use super::PERIOD_FILTER;
use crate::error::DbResult;
use gustanto_core::{Expense, Money, NewExpense, PeriodKey};

const EXPENSE_COLUMNS: &str = "id, \
     COALESCE(amount, 0) AS amount, \
     COALESCE(description, '') AS description, \
     COALESCE(timestamp, '') AS timestamp";

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Inserts an expense and returns its id.
    pub async fn insert(&self, expense: &NewExpense) -> DbResult<i64> {
        debug!(
            amount = %expense.amount(),
            description = %expense.description(),
            "Inserting expense"
        );

        let result = sqlx::query(
            "INSERT INTO expenses (amount, description, timestamp) VALUES (?1, ?2, ?3)",
        )
        .bind(expense.amount())
        .bind(expense.description())
        .bind(expense.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Expenses in a period, oldest first.
    pub async fn list_for_period(&self, period: &PeriodKey) -> DbResult<Vec<Expense>> {
        let sql = format!(
            "SELECT {} FROM expenses WHERE {} ORDER BY timestamp ASC, id ASC",
            EXPENSE_COLUMNS, PERIOD_FILTER
        );

        let expenses = sqlx::query_as::<_, Expense>(&sql)
            .bind(period.prefix())
            .fetch_all(&self.pool)
            .await?;

        Ok(expenses)
    }

    /// Sum of expense amounts in a period. Zero when there are none.
    pub async fn total_for_period(&self, period: &PeriodKey) -> DbResult<Money> {
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE {}",
            PERIOD_FILTER
        );

        let total: i64 = sqlx::query_scalar(&sql)
            .bind(period.prefix())
            .fetch_one(&self.pool)
            .await?;

        Ok(Money::from_minor(total))
    }

    /// Number of expense rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM expenses")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
