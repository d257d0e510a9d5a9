//! # Validation Module
//!
//! Input validation for Caja POS.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: HTTP extractors (serde)                                       │
//! │  ├── Shape and type of JSON bodies and query strings                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Quantities, prices, names, search terms                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── CHECK (stock >= 0), CHECK (subtotal = quantity * unit_price)      │
//! │  └── UNIQUE (sales.number), foreign keys                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MIN_SEARCH_TERM_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name: non-empty, at most 200 characters.
///
/// ```rust
/// use caja_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Coca-Cola 1.5L").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)
}

/// Validates a login name: non-empty, at most 150 characters.
pub fn validate_username(username: &str) -> ValidationResult<()> {
    validate_text("username", username, 150)
}

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Normalizes a product search term: trimmed and lowercased.
///
/// Returns `None` when the trimmed term is shorter than
/// [`MIN_SEARCH_TERM_LEN`] characters; callers answer with an empty list
/// rather than an error.
///
/// ```rust
/// use caja_core::validation::normalize_search_term;
///
/// assert_eq!(normalize_search_term(" CO "), Some("co".to_string()));
/// assert_eq!(normalize_search_term("AZÚCAR"), Some("azúcar".to_string()));
/// assert_eq!(normalize_search_term("c"), None);
/// ```
pub fn normalize_search_term(term: &str) -> Option<String> {
    let term = term.trim();
    if term.chars().count() < MIN_SEARCH_TERM_LEN || term.chars().count() > 100 {
        return None;
    }
    Some(term.to_lowercase())
}

/// The lowercased text a product is found by.
///
/// SQLite only folds ASCII case, so both sides of the match are folded in
/// Rust. Name and brand are kept on separate lines so a term never spans
/// the two.
pub fn search_key(name: &str, brand: &str) -> String {
    format!("{}\n{}", name.to_lowercase(), brand.to_lowercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## User Workflow
/// ```text
/// Cashier types quantity: 5
///      │
///      ▼
/// validate_quantity(5) ← THIS FUNCTION
///      │
///      ├── qty < 1?     → "quantity must be greater than 0"
///      ├── qty > 9999?  → "quantity must be between 1 and 9999"
///      └── OK           → stock check
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stored price. Zero is allowed, negative is not.
pub fn validate_price(field: &str, amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an opening stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Rejects adding a new row once the cart holds [`MAX_CART_ITEMS`] products.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

/// Rejects a whole cart with more than [`MAX_CART_ITEMS`] rows.
pub fn validate_cart_len(len: usize) -> ValidationResult<()> {
    if len > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_quantity(-3),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_quantity(MAX_ITEM_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_search_term_minimum() {
        assert_eq!(normalize_search_term(""), None);
        assert_eq!(normalize_search_term(" a "), None);
        assert_eq!(normalize_search_term("ÑU"), Some("ñu".to_string()));
        assert_eq!(normalize_search_term(&"x".repeat(101)), None);
    }

    #[test]
    fn test_search_key_folds_unicode() {
        assert_eq!(search_key("AZÚCAR Flor", "Iansa"), "azúcar flor\niansa");
        assert_eq!(search_key("Ñoquis", "ÑANDÚ"), "ñoquis\nñandú");
    }

    #[test]
    fn test_text_fields() {
        assert!(validate_product_name("Pan amasado").is_ok());
        assert!(matches!(
            validate_product_name(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_username(&"u".repeat(151)),
            Err(ValidationError::TooLong { max: 150, .. })
        ));
    }

    #[test]
    fn test_prices_and_stock() {
        assert!(validate_price("sale_price", 0).is_ok());
        assert!(validate_price("sale_price", -1).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
        assert!(validate_cart_len(MAX_CART_ITEMS).is_ok());
        assert!(validate_cart_len(MAX_CART_ITEMS + 1).is_err());
    }
}
