//! # Domain Types
//!
//! Ledger records and the validated payloads that create them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Stored (read back from SQLite)                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │      Sale       │   │     Expense     │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  id (i64)       │   │  id (i64)       │                              │
//! │  │  item           │   │  amount         │                              │
//! │  │  price          │   │  description    │                              │
//! │  │  timestamp      │   │  timestamp      │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  Validated inserts (only constructible through ::new)                   │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    NewOrder     │   │     NewSale     │   │   NewExpense    │        │
//! │  │  lines: 1..=500 │   │  one line item  │   │                 │        │
//! │  │  one timestamp  │   │                 │   │                 │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are immutable once written. Nothing in the system updates or
//! deletes them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::period::format_timestamp;
use crate::validation::{
    validate_amount, validate_description, validate_item_name, validate_order_size,
    validate_price, validate_timestamp, ValidationResult,
};

// =============================================================================
// Stored Records
// =============================================================================

/// One sold line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    /// Monotonic row id assigned by the store.
    pub id: i64,

    /// Item name as entered at the till.
    pub item: String,

    /// Price in minor units.
    pub price: Money,

    /// Local ISO-8601 timestamp, stored verbatim.
    pub timestamp: String,
}

/// One recorded expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub amount: Money,
    pub description: String,
    pub timestamp: String,
}

// =============================================================================
// Timestamps
// =============================================================================

/// Picks the timestamp for a new record.
///
/// A supplied, non-blank timestamp wins; otherwise the current local time
/// is formatted the way the ledger stores it. The result still goes through
/// [`validate_timestamp`] in the payload constructors.
pub fn resolve_timestamp(supplied: Option<&str>, now: NaiveDateTime) -> String {
    match supplied.map(str::trim) {
        Some(ts) if !ts.is_empty() => ts.to_string(),
        _ => format_timestamp(now),
    }
}

// =============================================================================
// Insert Payloads
// =============================================================================

/// A sale line item as submitted in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Item name (`name` on the wire).
    pub name: String,

    /// Price in minor units.
    pub price: i64,
}

/// A single validated sale insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    item: String,
    price: Money,
    timestamp: String,
}

impl NewSale {
    /// Validates and builds a sale insert.
    ///
    /// ```rust
    /// use gustanto_core::NewSale;
    ///
    /// let sale = NewSale::new(" Coffee ", 150, "2024-05-01T10:00:00").unwrap();
    /// assert_eq!(sale.item(), "Coffee");
    /// assert!(NewSale::new("Coffee", -1, "2024-05-01T10:00:00").is_err());
    /// ```
    pub fn new(item: &str, price: i64, timestamp: &str) -> ValidationResult<Self> {
        let item = validate_item_name(item)?;
        validate_price(price)?;
        let timestamp = validate_timestamp(timestamp)?;

        Ok(NewSale {
            item,
            price: Money::from_minor(price),
            timestamp,
        })
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// A validated multi-line order. Every line shares one timestamp and the
/// store writes all of them or none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    lines: Vec<NewSale>,
    timestamp: String,
}

impl NewOrder {
    /// Validates every line and the shared timestamp.
    ///
    /// The first invalid line fails the whole order.
    pub fn new(lines: &[OrderLine], timestamp: &str) -> ValidationResult<Self> {
        validate_order_size(lines.len())?;
        let timestamp = validate_timestamp(timestamp)?;

        let lines = lines
            .iter()
            .map(|line| NewSale::new(&line.name, line.price, &timestamp))
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(NewOrder { lines, timestamp })
    }

    pub fn lines(&self) -> &[NewSale] {
        &self.lines
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Sum of all line prices.
    pub fn total(&self) -> Money {
        self.lines.iter().map(NewSale::price).sum()
    }
}

/// A validated expense insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    amount: Money,
    description: String,
    timestamp: String,
}

impl NewExpense {
    pub fn new(amount: i64, description: &str, timestamp: &str) -> ValidationResult<Self> {
        validate_amount(amount)?;
        let description = validate_description(description)?;
        let timestamp = validate_timestamp(timestamp)?;

        Ok(NewExpense {
            amount: Money::from_minor(amount),
            description,
            timestamp,
        })
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use chrono::NaiveDate;

    const TS: &str = "2024-05-01T10:00:00";

    fn line(name: &str, price: i64) -> OrderLine {
        OrderLine {
            name: name.to_string(),
            price,
        }
    }

    #[test]
    fn test_resolve_timestamp() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(18, 30, 0, 250)
            .unwrap();

        assert_eq!(resolve_timestamp(Some(TS), now), TS);
        assert_eq!(resolve_timestamp(None, now), "2024-05-01T18:30:00.000250");
        assert_eq!(resolve_timestamp(Some("  "), now), "2024-05-01T18:30:00.000250");
    }

    #[test]
    fn test_order_shares_timestamp_and_totals() {
        let order = NewOrder::new(&[line("Coffee", 150), line("Bun", 40)], TS).unwrap();

        assert_eq!(order.lines().len(), 2);
        assert!(order.lines().iter().all(|l| l.timestamp() == TS));
        assert_eq!(order.total(), Money::from_minor(190));
    }

    #[test]
    fn test_order_rejects_empty() {
        assert!(matches!(
            NewOrder::new(&[], TS),
            Err(ValidationError::TooMany { .. })
        ));
    }

    #[test]
    fn test_order_is_all_or_nothing() {
        let result = NewOrder::new(&[line("Coffee", 150), line("", 40)], TS);
        assert_eq!(result.unwrap_err(), ValidationError::required("item"));

        let result = NewOrder::new(&[line("Coffee", 150), line("Bun", -40)], TS);
        assert!(result.is_err());
    }

    #[test]
    fn test_order_rejects_overflowing_price() {
        let result = NewOrder::new(&[line("A", i64::MAX), line("B", 1)], TS);
        assert!(matches!(
            result,
            Err(ValidationError::OutOfRange { field, .. }) if field == "price"
        ));

        let order = NewOrder::new(
            &vec![line("Banquet", crate::MAX_PRICE); crate::MAX_ORDER_LINES],
            TS,
        )
        .unwrap();
        assert_eq!(
            order.total(),
            Money::from_minor(crate::MAX_PRICE * crate::MAX_ORDER_LINES as i64)
        );
    }

    #[test]
    fn test_new_expense() {
        let expense = NewExpense::new(50, " Milk ", TS).unwrap();
        assert_eq!(expense.description(), "Milk");
        assert_eq!(expense.amount(), Money::from_minor(50));

        assert!(NewExpense::new(50, "", TS).is_err());
        assert!(NewExpense::new(-1, "Milk", TS).is_err());
        assert!(NewExpense::new(50, "Milk", "not a date").is_err());
    }

    #[test]
    fn test_sale_serializes_flat() {
        let sale = Sale {
            id: 7,
            item: "Coffee".to_string(),
            price: Money::from_minor(150),
            timestamp: TS.to_string(),
        };

        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "item": "Coffee", "price": 150, "timestamp": TS})
        );
    }
}
