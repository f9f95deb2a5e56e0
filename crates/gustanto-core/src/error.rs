//! # Error Types
//!
//! Domain-specific error types for gustanto-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gustanto-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                           │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  gustanto-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  Server errors (in app)                                                 │
//! │  └── ApiError         - What HTTP clients see (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → JSON body               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Export or report period identifier is not one we know.
    ///
    /// ## When This Occurs
    /// - `GET /export/yesterday` (only `today` and `month` exist)
    #[error("Invalid period: {0}")]
    UnknownPeriod(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a request payload doesn't meet requirements.
/// Used for early validation before anything touches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., bad date, bad month key).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Collection holds fewer or more entries than allowed.
    #[error("{field} must contain between {min} and {max} entries")]
    TooMany { field: String, min: usize, max: usize },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("price");
        assert_eq!(err.to_string(), "price is required");

        let err = ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        };
        assert_eq!(err.to_string(), "description must be at most 500 characters");
    }

    #[test]
    fn test_unknown_period_message() {
        let err = CoreError::UnknownPeriod("yesterday".to_string());
        assert_eq!(err.to_string(), "Invalid period: yesterday");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("item").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
