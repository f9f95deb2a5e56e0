//! # Ledger Reports
//!
//! Period queries shared by the report routes and the summary scheduler.
//!
//! ```text
//!   PeriodKey ──► sales.list_for_period ──► rows ──► Σ price ──┐
//!            └──► expenses.total_for_period ───────────────────┴─► PeriodSummary
//! ```
//!
//! A report's sales total is summed from the rows it returns, so the two
//! can never disagree within one response.

use gustanto_core::{
    daily_breakdown, DailyBreakdown, Money, PeriodKey, PeriodSummary, Sale, YearMonth,
};
use gustanto_db::{Database, DbResult};
use tracing::debug;

/// Sales rows of a period together with its totals.
#[derive(Debug, Clone)]
pub struct PeriodReport {
    pub sales: Vec<Sale>,
    pub summary: PeriodSummary,
}

/// Totals only. Used when the rows themselves are not needed.
pub async fn summarize(db: &Database, period: &PeriodKey) -> DbResult<PeriodSummary> {
    let total_sales = db.sales().total_for_period(period).await?;
    let total_expenses = db.expenses().total_for_period(period).await?;

    Ok(PeriodSummary::new(period, total_sales, total_expenses))
}

/// Rows plus totals for `/sales/today`, `/sales/month` and exports.
pub async fn period_report(db: &Database, period: &PeriodKey) -> DbResult<PeriodReport> {
    let sales = db.sales().list_for_period(period).await?;
    let total_expenses = db.expenses().total_for_period(period).await?;
    let total_sales: Money = sales.iter().map(|s| s.price).sum();

    debug!(%period, rows = sales.len(), "Built period report");

    Ok(PeriodReport {
        summary: PeriodSummary::new(period, total_sales, total_expenses),
        sales,
    })
}

/// Per-day totals for a month, ascending, only days with activity.
pub async fn month_chart(db: &Database, month: YearMonth) -> DbResult<Vec<DailyBreakdown>> {
    let period = PeriodKey::Month(month);
    let sales = db.sales().list_for_period(&period).await?;
    let expenses = db.expenses().list_for_period(&period).await?;

    Ok(daily_breakdown(&sales, &expenses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gustanto_core::{NewExpense, NewOrder, OrderLine, MAX_PRICE};
    use gustanto_db::DbConfig;

    fn line(name: &str, price: i64) -> OrderLine {
        OrderLine {
            name: name.to_string(),
            price,
        }
    }

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = NewOrder::new(
            &[line("Coffee", 150), line("Muffin", 90)],
            "2024-05-01T10:00:00",
        )
        .unwrap();
        db.sales().record_order(&order).await.unwrap();

        let later = NewOrder::new(&[line("Tea", 40)], "2024-05-03T09:30:00").unwrap();
        db.sales().record_order(&later).await.unwrap();

        db.expenses()
            .insert(&NewExpense::new(50, "Milk", "2024-05-01T10:00:00").unwrap())
            .await
            .unwrap();
        db.expenses()
            .insert(&NewExpense::new(500, "Rent", "2024-05-05T08:00:00").unwrap())
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_report_totals_match_rows() {
        let db = seeded().await;
        let may = PeriodKey::Month(YearMonth::new(2024, 5).unwrap());

        let report = period_report(&db, &may).await.unwrap();
        assert_eq!(report.sales.len(), 3);
        assert_eq!(report.summary.total_sales(), Money::from_minor(280));
        assert_eq!(report.summary.total_expenses(), Money::from_minor(550));
        assert_eq!(report.summary.net_profit(), Money::from_minor(-270));

        assert_eq!(summarize(&db, &may).await.unwrap(), report.summary);
    }

    #[tokio::test]
    async fn test_empty_day_is_all_zero() {
        let db = seeded().await;
        let day = PeriodKey::Day(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());

        let summary = summarize(&db, &day).await.unwrap();
        assert!(summary.total_sales().is_zero());
        assert!(summary.total_expenses().is_zero());
        assert!(summary.net_profit().is_zero());
    }

    #[tokio::test]
    async fn test_month_chart() {
        let db = seeded().await;
        let chart = month_chart(&db, YearMonth::new(2024, 5).unwrap()).await.unwrap();

        let dates: Vec<&str> = chart.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, ["2024-05-01", "2024-05-03", "2024-05-05"]);
        assert_eq!(chart[0].sales, Money::from_minor(240));
        assert_eq!(chart[0].net_profit, Money::from_minor(190));
        assert_eq!(chart[2].expenses, Money::from_minor(500));

        let june = month_chart(&db, YearMonth::new(2024, 6).unwrap()).await.unwrap();
        assert!(june.is_empty());
    }

    #[tokio::test]
    async fn test_largest_prices_sum_without_overflow() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ts = "2024-05-01T10:00:00";
        let order = NewOrder::new(&[line("Banquet", MAX_PRICE), line("Hall", MAX_PRICE)], ts).unwrap();
        db.sales().record_order(&order).await.unwrap();
        db.expenses()
            .insert(&NewExpense::new(MAX_PRICE, "Caterer", ts).unwrap())
            .await
            .unwrap();

        assert!(NewOrder::new(&[line("A", i64::MAX), line("B", 1)], ts).is_err());

        let day = PeriodKey::Day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let report = period_report(&db, &day).await.unwrap();
        assert_eq!(report.summary.total_sales(), Money::from_minor(2 * MAX_PRICE));
        assert_eq!(report.summary.net_profit(), Money::from_minor(MAX_PRICE));
        assert_eq!(summarize(&db, &day).await.unwrap(), report.summary);

        let chart = month_chart(&db, YearMonth::new(2024, 5).unwrap()).await.unwrap();
        assert_eq!(chart[0].net_profit, Money::from_minor(MAX_PRICE));
    }
}
