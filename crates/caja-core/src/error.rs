//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caja-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  caja-db errors (separate crate)                                       │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── SaleError        - CoreError | DbError from the sale engine       │
//! │                                                                         │
//! │  caja-server errors                                                    │
//! │  └── ApiError         - What HTTP clients see (JSON + status)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SaleError → ApiError → Client     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant here aborts the enclosing sale transaction. None of them
//! is retried.

use thiserror::Error;

use crate::types::SaleStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Checkout or re-edit attempted with no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// The cart adds up to nothing.
    #[error("Sale total cannot be 0")]
    ZeroTotal,

    /// Product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Not enough units on the shelf.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (qty: 3)
    ///      │
    ///      ▼
    /// Ledger deduct: stock=2
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Coca-Cola 1.5L", available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// Whole transaction rolled back, client shows the product name
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Sale id does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(i64),

    /// The requested status change is not allowed from the current state.
    #[error("Cannot move sale from {from} to {to}")]
    InvalidStatusTransition { from: SaleStatus, to: SaleStatus },

    /// Cancelling a sale that is already cancelled.
    #[error("Sale is already cancelled")]
    AlreadyCancelled,

    /// Persisted status/flag pair that no transition can produce.
    #[error("Invalid sale state: status {status} with stock deducted = {stock_deducted}")]
    InvalidSaleState {
        status: SaleStatus,
        stock_deducted: bool,
    },

    /// A COMPLETED sale must carry a positive total.
    #[error("Cannot complete a sale without products")]
    CompletedWithoutTotal,

    /// A subtotal or total does not fit in an `i64`.
    #[error("Amount is too large")]
    AmountOverflow,

    /// The acting user lacks the required role.
    #[error("{0} requires the admin role")]
    AdminRequired(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business rule runs, so they never touch stock.
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

    /// Value must be positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_names_product() {
        let err = CoreError::InsufficientStock {
            product: "Coca-Cola 1.5L".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Coca-Cola 1.5L: available 2, requested 3"
        );
    }

    #[test]
    fn test_transition_message_uses_wire_names() {
        let err = CoreError::InvalidStatusTransition {
            from: SaleStatus::Cancelled,
            to: SaleStatus::Completed,
        };
        assert_eq!(err.to_string(), "Cannot move sale from CANCELLED to COMPLETED");
        assert_eq!(CoreError::AlreadyCancelled.to_string(), "Sale is already cancelled");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(
            core_err.to_string(),
            "Validation error: quantity must be greater than 0"
        );
    }
}
