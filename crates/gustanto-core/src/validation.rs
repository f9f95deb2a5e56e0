//! # Validation Module
//!
//! Input validation for everything that ends up in the ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json)                                    │
//! │  ├── Body is JSON, fields present, types right                          │
//! │  └── Rejections become VALIDATION_ERROR                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Blank names, negative prices, oversized orders                     │
//! │  └── Caller-supplied timestamps must start with a real date             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  └── Schema accepts whatever reaches it                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gustanto_core::validation::{validate_item_name, validate_price};
//!
//! assert_eq!(validate_item_name("  Coffee ").unwrap(), "Coffee");
//! assert!(validate_price(-5).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::{MAX_DESCRIPTION_LEN, MAX_ITEM_NAME_LEN, MAX_ORDER_LINES, MAX_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a sold item's name.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters (counted as characters, not bytes)
///
/// ## Returns
/// The trimmed name.
pub fn validate_item_name(name: &str) -> ValidationResult<String> {
    validate_text("item", name, MAX_ITEM_NAME_LEN)
}

/// Validates an expense description.
///
/// ## Rules
/// - Must not be blank
/// - At most 500 characters
pub fn validate_description(description: &str) -> ValidationResult<String> {
    validate_text("description", description, MAX_DESCRIPTION_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

fn validate_minor_units(field: &str, value: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE,
        });
    }

    Ok(())
}

/// Validates a sale price in minor units.
///
/// Zero is allowed (complimentary items). The ceiling is MAX_PRICE.
///
/// ```rust
/// use gustanto_core::validation::validate_price;
///
/// assert!(validate_price(150).is_ok());
/// assert!(validate_price(0).is_ok());
/// assert!(validate_price(-1).is_err());
/// assert!(validate_price(i64::MAX).is_err());
/// ```
pub fn validate_price(price: i64) -> ValidationResult<()> {
    validate_minor_units("price", price)
}

/// Validates an expense amount in minor units, same bounds as a price.
pub fn validate_amount(amount: i64) -> ValidationResult<()> {
    validate_minor_units("amount", amount)
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of line items in one order.
///
/// ## Rules
/// - At least one line
/// - At most MAX_ORDER_LINES (500)
pub fn validate_order_size(lines: usize) -> ValidationResult<()> {
    if lines == 0 || lines > MAX_ORDER_LINES {
        return Err(ValidationError::TooMany {
            field: "order".to_string(),
            min: 1,
            max: MAX_ORDER_LINES,
        });
    }

    Ok(())
}

// =============================================================================
// Timestamp Validator
// =============================================================================

/// Validates a caller-supplied timestamp.
///
/// ## Rules
/// ```text
///   2024-05-01                      ok  (date only)
///   2024-05-01T10:00:00             ok
///   2024-05-01 10:00:00.123+05:30   ok  (suffix kept verbatim)
///   2024-5-1T10:00                  rejected, not YYYY-MM-DD
///   2024-02-30T10:00                rejected, no such date
///   2024-05-01X10:00                rejected, separator must be T or space
/// ```
///
/// Only the date is checked because period filtering reads nothing else.
///
/// ## Returns
/// The trimmed timestamp, otherwise unchanged.
pub fn validate_timestamp(timestamp: &str) -> ValidationResult<String> {
    let timestamp = timestamp.trim();

    if timestamp.is_empty() {
        return Err(ValidationError::required("timestamp"));
    }

    let date_part = timestamp
        .get(..10)
        .ok_or_else(|| ValidationError::invalid_format("timestamp", "must start with YYYY-MM-DD"))?;

    let well_formed = date_part
        .bytes()
        .enumerate()
        .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() });

    if !well_formed || NaiveDate::parse_from_str(date_part, "%Y-%m-%d").is_err() {
        return Err(ValidationError::invalid_format(
            "timestamp",
            "must start with a valid YYYY-MM-DD date",
        ));
    }

    if let Some(sep) = timestamp.as_bytes().get(10) {
        if *sep != b'T' && *sep != b' ' {
            return Err(ValidationError::invalid_format(
                "timestamp",
                "date and time must be separated by 'T' or a space",
            ));
        }
    }

    Ok(timestamp.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
