//! # Sale Repository
//!
//! Database operations for sold line items.
//!
//! ## Order Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /order  [{Coffee,150}, {Bun,40}, {Tea,60}]                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    INSERT Coffee ─┐                                                     │
//! │    INSERT Bun     ├── any failure → ROLLBACK (tx dropped), no rows      │
//! │    INSERT Tea    ─┘                                                     │
//! │  COMMIT ← only now do reports see the three rows                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use super::PERIOD_FILTER;
use crate::error::{DbError, DbResult};
use gustanto_core::{Money, NewOrder, NewSale, PeriodKey, Sale};

const SALE_COLUMNS: &str = "id, \
     COALESCE(item, '') AS item, \
     COALESCE(price, 0) AS price, \
     COALESCE(timestamp, '') AS timestamp";

const INSERT_SALE: &str = "INSERT INTO sales (item, price, timestamp) VALUES (?1, ?2, ?3)";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records every line of an order in one transaction.
    ///
    /// ## Returns
    /// The new row ids, in line order.
    pub async fn record_order(&self, order: &NewOrder) -> DbResult<Vec<i64>> {
        debug!(
            lines = order.lines().len(),
            total = %order.total(),
            timestamp = %order.timestamp(),
            "Recording order"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut ids = Vec::with_capacity(order.lines().len());
        for line in order.lines() {
            let result = sqlx::query(INSERT_SALE)
                .bind(line.item())
                .bind(line.price())
                .bind(line.timestamp())
                .execute(&mut *tx)
                .await?;
            ids.push(result.last_insert_rowid());
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(ids)
    }

    /// Inserts a single sale row.
    pub async fn insert(&self, sale: &NewSale) -> DbResult<i64> {
        debug!(item = %sale.item(), price = %sale.price(), "Inserting sale");

        let result = sqlx::query(INSERT_SALE)
            .bind(sale.item())
            .bind(sale.price())
            .bind(sale.timestamp())
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// All sales, newest first. Ties on timestamp go to the later id.
    pub async fn list_all(&self) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales ORDER BY timestamp DESC, id DESC",
            SALE_COLUMNS
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Sales in a period, oldest first.
    pub async fn list_for_period(&self, period: &PeriodKey) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales WHERE {} ORDER BY timestamp ASC, id ASC",
            SALE_COLUMNS, PERIOD_FILTER
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(period.prefix())
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Sum of sale prices in a period. Zero when there are none.
    pub async fn total_for_period(&self, period: &PeriodKey) -> DbResult<Money> {
        let sql = format!(
            "SELECT COALESCE(SUM(price), 0) FROM sales WHERE {}",
            PERIOD_FILTER
        );

        let total: i64 = sqlx::query_scalar(&sql)
            .bind(period.prefix())
            .fetch_one(&self.pool)
            .await?;

        Ok(Money::from_minor(total))
    }

    /// Number of sale rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use chrono::NaiveDate;
    use gustanto_core::{Money, NewOrder, NewSale, OrderLine, PeriodKey, YearMonth};
    use tokio::task::JoinSet;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn line(name: &str, price: i64) -> OrderLine {
        OrderLine {
            name: name.to_string(),
            price,
        }
    }

    fn may_2024() -> PeriodKey {
        PeriodKey::Month(YearMonth::new(2024, 5).unwrap())
    }

    fn may_first() -> PeriodKey {
        PeriodKey::Day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    #[tokio::test]
    async fn test_record_order_adds_every_line() {
        let db = db().await;
        let order = NewOrder::new(
            &[line("Coffee", 150), line("Bun", 40), line("Tea", 60)],
            "2024-05-01T10:00:00",
        )
        .unwrap();

        let ids = db.sales().record_order(&order).await.unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let sales = db.sales().list_for_period(&may_first()).await.unwrap();
        assert_eq!(sales.len(), 3);
        assert!(sales.iter().all(|s| s.timestamp == "2024-05-01T10:00:00"));
        assert_eq!(
            db.sales().total_for_period(&may_first()).await.unwrap(),
            Money::from_minor(250)
        );
    }

    #[tokio::test]
    async fn test_record_order_is_all_or_nothing() {
        let db = db().await;
        sqlx::query(
            "CREATE TRIGGER reject_boom BEFORE INSERT ON sales
             WHEN NEW.item = 'Boom'
             BEGIN SELECT RAISE(ABORT, 'boom'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let order = NewOrder::new(
            &[line("Coffee", 150), line("Bun", 40), line("Boom", 1)],
            "2024-05-01T10:00:00",
        )
        .unwrap();

        let err = db.sales().record_order(&order).await.unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let db = db().await;
        let sales = db.sales();

        let a = sales
            .insert(&NewSale::new("A", 10, "2024-05-01T09:00:00").unwrap())
            .await
            .unwrap();
        let b = sales
            .insert(&NewSale::new("B", 20, "2024-05-02T09:00:00").unwrap())
            .await
            .unwrap();
        let c = sales
            .insert(&NewSale::new("C", 30, "2024-05-01T09:00:00").unwrap())
            .await
            .unwrap();

        let ids: Vec<i64> = sales.list_all().await.unwrap().iter().map(|s| s.id).collect();
        // Same timestamp for A and C: the later id wins
        assert_eq!(ids, vec![b, c, a]);
    }

    #[tokio::test]
    async fn test_period_filter_is_prefix_match() {
        let db = db().await;
        let sales = db.sales();

        for (item, ts) in [
            ("may-1", "2024-05-01T10:00:00"),
            ("may-1-space", "2024-05-01 22:00:00"),
            ("may-31", "2024-05-31T23:59:59.999999"),
            ("june", "2024-06-01T00:00:00"),
            ("may-2023", "2023-05-01T10:00:00"),
        ] {
            sales.insert(&NewSale::new(item, 100, ts).unwrap()).await.unwrap();
        }

        let month: Vec<String> = sales
            .list_for_period(&may_2024())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.item)
            .collect();
        assert_eq!(month, ["may-1", "may-1-space", "may-31"]);

        assert_eq!(
            sales.total_for_period(&may_first()).await.unwrap(),
            Money::from_minor(200)
        );
    }

    #[tokio::test]
    async fn test_total_for_empty_period_is_zero() {
        let db = db().await;
        assert!(db.sales().total_for_period(&may_2024()).await.unwrap().is_zero());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_are_never_seen_half_written() {
        const WRITERS: usize = 8;
        const ORDERS_PER_WRITER: usize = 5;
        const PRICES: [i64; 4] = [150, 40, 60, 7];
        let order_total: i64 = PRICES.iter().sum();

        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("concurrent.db")).max_connections(5))
            .await
            .unwrap();
        let lines: Vec<OrderLine> = PRICES
            .iter()
            .enumerate()
            .map(|(i, &price)| line(&format!("item-{}", i), price))
            .collect();
        let order = NewOrder::new(&lines, "2024-05-01T10:00:00").unwrap();

        let mut writers = JoinSet::new();
        for _ in 0..WRITERS {
            let db = db.clone();
            let order = order.clone();
            writers.spawn(async move {
                for _ in 0..ORDERS_PER_WRITER {
                    db.sales().record_order(&order).await.unwrap();
                }
            });
        }

        let mut readers = JoinSet::new();
        for _ in 0..3 {
            let db = db.clone();
            readers.spawn(async move {
                let mut observed = Vec::new();
                for _ in 0..40 {
                    let total = db.sales().total_for_period(&may_first()).await.unwrap();
                    observed.push(total.minor());
                    tokio::task::yield_now().await;
                }
                observed
            });
        }

        while let Some(result) = writers.join_next().await {
            result.unwrap();
        }
        while let Some(result) = readers.join_next().await {
            for total in result.unwrap() {
                assert_eq!(total % order_total, 0, "saw a partial order: {}", total);
            }
        }

        let orders = (WRITERS * ORDERS_PER_WRITER) as i64;
        assert_eq!(
            db.sales().count().await.unwrap(),
            orders * PRICES.len() as i64
        );
        assert_eq!(
            db.sales().total_for_period(&may_first()).await.unwrap(),
            Money::from_minor(orders * order_total)
        );
        db.close().await;
    }

    #[tokio::test]
    async fn test_legacy_null_columns_read_as_defaults() {
        let db = db().await;
        sqlx::query("INSERT INTO sales (item, price, timestamp) VALUES (NULL, NULL, '2024-05-01T10:00:00')")
            .execute(db.pool())
            .await
            .unwrap();

        let sales = db.sales().list_all().await.unwrap();
        assert_eq!(sales[0].item, "");
        assert!(sales[0].price.is_zero());
    }
}
