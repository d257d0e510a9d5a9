//! # Cart
//!
//! The working cart of one till session.
//!
//! ## User Workflow
//! ```text
//! search "coca" ──► add(product, 1) ──► update(product, 3) ──► POST /sales
//!                        │                    │                    │
//!                        ▼                    ▼                    ▼
//!                 merge by product     qty within stock   validate_for_checkout
//! ```
//!
//! The cart never holds stock. Quantities are checked against the shelf
//! when added so the cashier finds out early, and checked again by the
//! ledger at checkout.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_cart_len, validate_cart_size, validate_price, validate_quantity};

/// One cart row. `price` is the unit price captured when the product was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub price: i64,
}

impl CartItem {
    pub fn subtotal(&self) -> CoreResult<Money> {
        Money::from_minor(self.price).multiply_quantity(self.quantity)
    }

    /// Rows sent by a client carry their own price, so both numbers are checked.
    pub fn validate(&self) -> CoreResult<()> {
        validate_quantity(self.quantity)?;
        validate_price("price", self.price)?;
        Ok(())
    }
}

/// Ordered list of cart rows, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps rows as they are. Nothing is checked until checkout.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Cart { items }
    }

    /// Builds a cart from client rows, rejecting bad rows and totals that overflow.
    pub fn try_from_items(items: Vec<CartItem>) -> CoreResult<Self> {
        let mut cart = Cart::new();
        cart.replace(items)?;
        Ok(cart)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn total(&self) -> CoreResult<Money> {
        sum_subtotals(&self.items)
    }

    /// Adds `quantity` units of `product`, merging with an existing row.
    ///
    /// The merged quantity must fit in the product's current stock.
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let position = self.items.iter().position(|i| i.product_id == product.id);
        let current = position.map(|idx| self.items[idx].quantity).unwrap_or(0);
        let requested = current + quantity;

        validate_quantity(requested)?;
        ensure_stock(product, requested)?;

        match position {
            Some(idx) => self.items[idx].quantity = requested,
            None => {
                validate_cart_size(self.items.len())?;
                self.items.push(CartItem {
                    product_id: product.id,
                    name: product.name.clone(),
                    quantity: requested,
                    price: product.sale_price,
                });
            }
        }
        Ok(())
    }

    /// Sets the quantity of an existing row.
    ///
    /// A product that is not in the cart leaves it unchanged; the return
    /// value says whether a row was updated.
    pub fn update(&mut self, product: &Product, quantity: i64) -> CoreResult<bool> {
        validate_quantity(quantity)?;
        ensure_stock(product, quantity)?;

        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drops the row for `product_id`. Returns whether one was present.
    pub fn remove(&mut self, product_id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    /// Replaces the whole cart. On error the cart is left as it was.
    pub fn replace(&mut self, items: Vec<CartItem>) -> CoreResult<()> {
        validate_cart_len(items.len())?;
        for item in &items {
            item.validate()?;
        }
        sum_subtotals(&items)?;

        self.items = items;
        Ok(())
    }

    /// Checks the rules a cart must meet before it becomes a sale.
    pub fn validate_for_checkout(&self) -> CoreResult<()> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        for item in &self.items {
            item.validate()?;
        }
        if !self.total()?.is_positive() {
            return Err(CoreError::ZeroTotal);
        }
        Ok(())
    }
}

fn sum_subtotals(items: &[CartItem]) -> CoreResult<Money> {
    items
        .iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.subtotal()?))
}

fn ensure_stock(product: &Product, requested: i64) -> CoreResult<()> {
    if !product.has_stock_for(requested) {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock,
            requested,
        });
    }
    Ok(())
}
