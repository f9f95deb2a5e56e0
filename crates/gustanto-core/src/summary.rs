//! # Summaries
//!
//! Derived views over the ledger. Nothing here is ever persisted; every
//! summary is recomputed from the records on demand.
//!
//! ## Net Profit Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   net_profit = total_sales - total_expenses     (same period, always)   │
//! │                                                                         │
//! │   PeriodSummary and DailyBreakdown have no constructor that takes a     │
//! │   net profit. It is computed, so it cannot drift from its inputs.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::collections::BTreeMap;

use crate::money::Money;
use crate::period::{day_key, PeriodKey};
use crate::types::{Expense, Sale};

// =============================================================================
// Period Summary
// =============================================================================

/// Totals for one day or one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    period: String,
    total_sales: Money,
    total_expenses: Money,
    net_profit: Money,
}

impl PeriodSummary {
    /// ```rust
    /// use chrono::NaiveDate;
    /// use gustanto_core::{Money, PeriodKey, PeriodSummary};
    ///
    /// let day = PeriodKey::Day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    /// let summary = PeriodSummary::new(&day, Money::from_minor(150), Money::from_minor(50));
    /// assert_eq!(summary.net_profit(), Money::from_minor(100));
    /// ```
    pub fn new(period: &PeriodKey, total_sales: Money, total_expenses: Money) -> Self {
        PeriodSummary {
            period: period.prefix(),
            total_sales,
            total_expenses,
            net_profit: total_sales - total_expenses,
        }
    }

    /// The period key (`YYYY-MM-DD` or `YYYY-MM`).
    pub fn period(&self) -> &str {
        &self.period
    }

    pub fn total_sales(&self) -> Money {
        self.total_sales
    }

    pub fn total_expenses(&self) -> Money {
        self.total_expenses
    }

    pub fn net_profit(&self) -> Money {
        self.net_profit
    }
}

// =============================================================================
// Daily Breakdown
// =============================================================================

/// One row of the month chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBreakdown {
    pub date: String,
    pub sales: Money,
    pub expenses: Money,
    pub net_profit: Money,
}

/// Groups records by day key (first 10 characters of the timestamp).
///
/// ## Output
/// - Sorted by date, ascending
/// - Only days with at least one sale or expense
/// - Records are taken as given; callers pass one month's worth
pub fn daily_breakdown(sales: &[Sale], expenses: &[Expense]) -> Vec<DailyBreakdown> {
    let mut days: BTreeMap<&str, (Money, Money)> = BTreeMap::new();

    for sale in sales {
        days.entry(day_key(&sale.timestamp)).or_default().0 += sale.price;
    }

    for expense in expenses {
        days.entry(day_key(&expense.timestamp)).or_default().1 += expense.amount;
    }

    days.into_iter()
        .map(|(date, (sales, expenses))| DailyBreakdown {
            date: date.to_string(),
            sales,
            expenses,
            net_profit: sales - expenses,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::YearMonth;

    fn sale(id: i64, price: i64, ts: &str) -> Sale {
        Sale {
            id,
            item: format!("item-{}", id),
            price: Money::from_minor(price),
            timestamp: ts.to_string(),
        }
    }

    fn expense(id: i64, amount: i64, ts: &str) -> Expense {
        Expense {
            id,
            amount: Money::from_minor(amount),
            description: format!("expense-{}", id),
            timestamp: ts.to_string(),
        }
    }

    #[test]
    fn test_summary_with_nothing_recorded() {
        let month = PeriodKey::Month(YearMonth::new(2024, 5).unwrap());
        let summary = PeriodSummary::new(&month, Money::zero(), Money::zero());

        assert_eq!(summary.period(), "2024-05");
        assert!(summary.net_profit().is_zero());
    }

    #[test]
    fn test_summary_can_go_negative() {
        let month = PeriodKey::Month(YearMonth::new(2024, 5).unwrap());
        let summary = PeriodSummary::new(&month, Money::from_minor(20), Money::from_minor(70));
        assert_eq!(summary.net_profit(), Money::from_minor(-50));
    }

    #[test]
    fn test_summary_json_shape() {
        let month = PeriodKey::Month(YearMonth::new(2024, 5).unwrap());
        let summary = PeriodSummary::new(&month, Money::from_minor(150), Money::from_minor(50));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "period": "2024-05",
                "total_sales": 150,
                "total_expenses": 50,
                "net_profit": 100
            })
        );
    }

    #[test]
    fn test_daily_breakdown_sorted_and_grouped() {
        let sales = vec![
            sale(1, 100, "2024-05-03T09:00:00"),
            sale(2, 150, "2024-05-01T10:00:00"),
            sale(3, 50, "2024-05-01 18:00:00"),
        ];
        let expenses = vec![
            expense(1, 30, "2024-05-01T12:00:00"),
            expense(2, 500, "2024-05-02T08:00:00"),
        ];

        let chart = daily_breakdown(&sales, &expenses);
        let dates: Vec<&str> = chart.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, ["2024-05-01", "2024-05-02", "2024-05-03"]);

        assert_eq!(chart[0].sales, Money::from_minor(200));
        assert_eq!(chart[0].expenses, Money::from_minor(30));
        assert_eq!(chart[0].net_profit, Money::from_minor(170));

        // Expense-only day
        assert_eq!(chart[1].sales, Money::zero());
        assert_eq!(chart[1].net_profit, Money::from_minor(-500));
    }

    #[test]
    fn test_daily_breakdown_sums_match_totals() {
        let sales = vec![
            sale(1, 100, "2024-05-03T09:00:00"),
            sale(2, 150, "2024-05-01T10:00:00"),
        ];
        let expenses = vec![expense(1, 30, "2024-05-01T12:00:00")];

        let chart = daily_breakdown(&sales, &expenses);
        let sales_total: Money = chart.iter().map(|d| d.sales).sum();
        let expense_total: Money = chart.iter().map(|d| d.expenses).sum();

        assert_eq!(sales_total, Money::from_minor(250));
        assert_eq!(expense_total, Money::from_minor(30));
    }

    #[test]
    fn test_daily_breakdown_empty() {
        assert!(daily_breakdown(&[], &[]).is_empty());
    }
}
