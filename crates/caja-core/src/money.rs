//! # Money Module
//!
//! Provides the `Money` type for monetary values.
//!
//! ## Integer Pesos
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The till works in whole pesos. There is no minor unit in circulation.  │
//! │                                                                         │
//! │    Sale price   $11.900  (tax included)                                 │
//! │    Net price    $10.000  = floor(11900 / 1.19)                          │
//! │                                                                         │
//! │  Every amount is an i64. Division by 1.19 is done as                    │
//! │  amount * 100 / 119, so no float ever touches a stored value.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caja_core::money::Money;
//!
//! let price = Money::from_minor(2990);
//! let line = price.multiply_quantity(3).unwrap();
//! assert_eq!(line.amount(), 8970);
//! assert_eq!(line.to_string(), "$8.970");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// Product.sale_price ──► CartItem.price ──► SaleLine.unit_price
///                                                │
///                                   × quantity   ▼
///                                          SaleLine.subtotal ──► Sale.total
/// ```
///
/// Rows store plain `i64` columns; values are wrapped in `Money` wherever
/// arithmetic happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from the smallest currency unit.
    ///
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// let price = Money::from_minor(11900);
    /// assert_eq!(price.amount(), 11900);
    /// ```
    #[inline]
    pub const fn from_minor(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Product: Coca-Cola $2.990
    /// Quantity: 3
    ///      │
    ///      ▼
    /// multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ├── overflow?  → CoreError::AmountOverflow
    ///      ▼
    /// Line subtotal: $8.970
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> CoreResult<Money> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Adds two amounts, failing instead of wrapping.
    #[inline]
    pub fn checked_add(&self, other: Money) -> CoreResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with `.` as the thousands separator: `$11.900`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{}${}", sign, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Money(amount)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
