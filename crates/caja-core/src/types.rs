//! # Domain Types
//!
//! Core domain types used throughout Caja POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  sale_id (FK)   │       │
//! │  │  name, brand    │   │  number VTA-... │   │  product_id     │       │
//! │  │  purchase_price │   │  state          │   │  unit_price     │       │
//! │  │  sale_price     │   │  total          │   │  purchase_price │       │
//! │  │  stock >= 0     │   │  payment_method │   │  subtotal       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   SaleStatus    │   │ PaymentMethod   │   │      Role       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  PENDING        │   │  CASH           │   │  admin          │       │
//! │  │  COMPLETED      │   │  TRANSFER       │   │  seller         │       │
//! │  │  CANCELLED      │   │  DEBIT, CREDIT  │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Record vs Domain
//! A sale is persisted as a [`SaleRecord`] with two columns, `status` and
//! `is_stock_deducted`. Loading converts it into a [`Sale`] whose single
//! [`SaleState`] field can only hold the reachable combinations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::lifecycle::SaleState;
use crate::money::Money;
use crate::pricing;

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product on the shelf.
///
/// Both prices are stored as entered. Each carries its own flag saying
/// whether the 19% tax is already included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,

    /// Display name shown at the till and in search results.
    pub name: String,

    pub brand: String,

    pub category_id: Option<i64>,

    pub description: Option<String>,

    /// What the shop paid per unit.
    pub purchase_price: i64,

    pub is_purchase_with_tax: bool,

    /// Shelf price per unit.
    pub sale_price: i64,

    pub is_sale_with_tax: bool,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Inactive products are hidden from search and reports.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_minor(self.sale_price)
    }

    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_minor(self.purchase_price)
    }

    /// Purchase price with tax removed when it was entered tax-included.
    pub fn purchase_price_net(&self) -> Money {
        pricing::net_price(self.purchase_price(), self.is_purchase_with_tax)
    }

    /// Sale price with tax removed when it was entered tax-included.
    pub fn sale_price_net(&self) -> Money {
        pricing::net_price(self.sale_price(), self.is_sale_with_tax)
    }

    /// Margin of the net sale price over the net purchase price, in whole percent.
    pub fn profit_percentage(&self) -> i64 {
        pricing::profit_margin(self.purchase_price_net(), self.sale_price_net())
    }

    /// Checks whether `quantity` units can be taken from the shelf.
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Users
// =============================================================================

/// Role of a staff account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including re-editing closed sales.
    Admin,
    /// Runs the till.
    #[default]
    Seller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with [`CoreError::AdminRequired`] unless this user is an admin.
    pub fn require_admin(&self, action: &str) -> CoreResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::AdminRequired(action.to_string()))
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum SaleStatus {
    /// Sale recorded but not yet paid.
    Pending,
    /// Sale paid and closed.
    #[default]
    Completed,
    /// Sale voided. Terminal.
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "PENDING",
            SaleStatus::Completed => "COMPLETED",
            SaleStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    /// Bank transfer.
    Transfer,
    Debit,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Transfer => "TRANSFER",
            PaymentMethod::Debit => "DEBIT",
            PaymentMethod::Credit => "CREDIT",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale Number
// =============================================================================

/// Human-facing sale identifier: `VTA-` followed by at least five digits.
///
/// ```rust
/// use caja_core::types::SaleNumber;
///
/// assert_eq!(SaleNumber::new(1).to_string(), "VTA-00001");
/// assert_eq!(SaleNumber::new(123456).to_string(), "VTA-123456");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SaleNumber(i64);

impl SaleNumber {
    pub const PREFIX: &'static str = "VTA-";

    #[inline]
    pub const fn new(value: i64) -> Self {
        SaleNumber(value)
    }
}

impl fmt::Display for SaleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:05}", Self::PREFIX, self.0)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale as stored: status and stock flag in separate columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleRecord {
    pub id: i64,
    pub number: String,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub is_stock_deducted: bool,
    pub total: i64,
    pub user_id: Option<i64>,
    pub is_modified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sale with its status and stock flag folded into one [`SaleState`].
///
/// Serializes back into the record shape so clients still see `status`
/// and `is_stock_deducted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "SaleRecord")]
pub struct Sale {
    pub id: i64,
    pub number: String,
    pub payment_method: PaymentMethod,
    pub state: SaleState,
    pub total: i64,
    pub user_id: Option<i64>,
    pub is_modified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn status(&self) -> SaleStatus {
        self.state.status()
    }

    #[inline]
    pub fn is_stock_deducted(&self) -> bool {
        self.state.stock_deducted()
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total)
    }

    /// A COMPLETED sale must carry a positive total.
    pub fn validate(&self) -> CoreResult<()> {
        validate_header(self.status(), self.total())
    }
}

/// Header rule shared by every write of a sale row.
pub fn validate_header(status: SaleStatus, total: Money) -> CoreResult<()> {
    if status == SaleStatus::Completed && !total.is_positive() {
        return Err(CoreError::CompletedWithoutTotal);
    }
    Ok(())
}

impl TryFrom<SaleRecord> for Sale {
    type Error = CoreError;

    fn try_from(record: SaleRecord) -> Result<Self, Self::Error> {
        let state = SaleState::from_parts(record.status, record.is_stock_deducted)?;
        Ok(Sale {
            id: record.id,
            number: record.number,
            payment_method: record.payment_method,
            state,
            total: record.total,
            user_id: record.user_id,
            is_modified: record.is_modified,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl From<Sale> for SaleRecord {
    fn from(sale: Sale) -> Self {
        SaleRecord {
            id: sale.id,
            number: sale.number,
            payment_method: sale.payment_method,
            status: sale.state.status(),
            is_stock_deducted: sale.state.stock_deducted(),
            total: sale.total,
            user_id: sale.user_id,
            is_modified: sale.is_modified,
            created_at: sale.created_at,
            updated_at: sale.updated_at,
        }
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// One product row of a sale.
///
/// Prices and the tax flag are snapshots taken when the line was written,
/// so later edits to the product never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Price charged per unit.
    pub unit_price: i64,
    /// Purchase price per unit at the time of sale.
    pub purchase_price: i64,
    /// Always `quantity * unit_price`.
    pub subtotal: i64,
    /// Whether `unit_price` includes tax.
    pub is_tax_included: bool,
}

impl SaleLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.unit_price)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal)
    }
}

/// A line about to be inserted. The subtotal is derived, never supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSaleLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: i64,
    pub purchase_price: i64,
    pub is_tax_included: bool,
    subtotal: i64,
}

impl NewSaleLine {
    /// Builds a line for `product` at the price the cart carried.
    pub fn new(product: &Product, quantity: i64, unit_price: i64) -> CoreResult<Self> {
        let subtotal = Money::from_minor(unit_price).multiply_quantity(quantity)?;
        Ok(NewSaleLine {
            product_id: product.id,
            quantity,
            unit_price,
            purchase_price: product.purchase_price,
            is_tax_included: product.is_sale_with_tax,
            subtotal: subtotal.amount(),
        })
    }

    #[inline]
    pub fn subtotal(&self) -> i64 {
        self.subtotal
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: i64, sale_price: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id,
            name: format!("Product {id}"),
            brand: "Generic".to_string(),
            category_id: None,
            description: None,
            purchase_price: 10000,
            is_purchase_with_tax: false,
            sale_price,
            is_sale_with_tax: true,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn record(status: SaleStatus, deducted: bool, total: i64) -> SaleRecord {
        let now = Utc::now();
        SaleRecord {
            id: 1,
            number: "VTA-00001".to_string(),
            payment_method: PaymentMethod::Cash,
            status,
            is_stock_deducted: deducted,
            total,
            user_id: None,
            is_modified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sale_number_format() {
        assert_eq!(SaleNumber::new(1).to_string(), "VTA-00001");
        assert_eq!(SaleNumber::new(6).to_string(), "VTA-00006");
        assert_eq!(SaleNumber::new(123456).to_string(), "VTA-123456");
    }

    #[test]
    fn test_product_net_prices() {
        let mut p = product(1, 17850, 5);
        assert_eq!(p.sale_price_net().amount(), 15000);
        assert_eq!(p.purchase_price_net().amount(), 10000);
        assert_eq!(p.profit_percentage(), 50);

        p.purchase_price = 0;
        assert_eq!(p.profit_percentage(), 0);
    }

    #[test]
    fn test_new_sale_line_derives_subtotal() {
        let p = product(7, 2990, 10);
        let line = NewSaleLine::new(&p, 3, 2500).unwrap();
        assert_eq!(line.subtotal(), 7500);
        assert_eq!(line.purchase_price, 10000);
        assert!(line.is_tax_included);

        assert_eq!(
            NewSaleLine::new(&p, 3, i64::MAX / 2),
            Err(CoreError::AmountOverflow)
        );
    }

    #[test]
    fn test_record_to_sale_rejects_unreachable_state() {
        let err = Sale::try_from(record(SaleStatus::Completed, false, 100)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSaleState { .. }));

        let err = Sale::try_from(record(SaleStatus::Cancelled, true, 100)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSaleState { .. }));
    }

    #[test]
    fn test_sale_serializes_as_record() {
        let sale = Sale::try_from(record(SaleStatus::Pending, true, 2990)).unwrap();
        assert_eq!(sale.state, SaleState::PendingReserved);

        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["is_stock_deducted"], true);
        assert_eq!(json["payment_method"], "CASH");
    }

    #[test]
    fn test_completed_requires_total() {
        assert_eq!(
            validate_header(SaleStatus::Completed, Money::zero()),
            Err(CoreError::CompletedWithoutTotal)
        );
        assert!(validate_header(SaleStatus::Pending, Money::zero()).is_ok());
        assert!(validate_header(SaleStatus::Completed, Money::from_minor(1)).is_ok());
    }

    #[test]
    fn test_role_gate() {
        let now = Utc::now();
        let mut user = User {
            id: 1,
            username: "ana".to_string(),
            full_name: "Ana Pérez".to_string(),
            role: Role::Seller,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            user.require_admin("Editing a sale"),
            Err(CoreError::AdminRequired(_))
        ));
        user.role = Role::Admin;
        assert!(user.require_admin("Editing a sale").is_ok());
    }

    #[test]
    fn test_status_default_and_wire_names() {
        assert_eq!(SaleStatus::default(), SaleStatus::Completed);
        let parsed: SaleStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(parsed, SaleStatus::Pending);
        let method: PaymentMethod = serde_json::from_str("\"TRANSFER\"").unwrap();
        assert_eq!(method, PaymentMethod::Transfer);
    }
}
