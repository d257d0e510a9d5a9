//! # Sale Lifecycle Engine
//!
//! Every write to a sale goes through here, and each operation is exactly
//! one SQLite transaction.
//!
//! ## Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart.validate_for_checkout()       EmptyCart | ZeroTotal | quantity   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │  ├── next_number()                  VTA-00001, VTA-00002, ...          │
//! │  ├── insert_header(state)                                              │
//! │  ├── for each item:                                                    │
//! │  │     find product                 ProductNotFound                    │
//! │  │     StockLedger::deduct          InsufficientStock                  │
//! │  │     insert_line (price snapshot)                                    │
//! │  ├── total = Σ subtotal                                                │
//! │  └── write_header                   CompletedWithoutTotal              │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any error drops the transaction: no header, no lines, no stock moved, │
//! │  and the number is not consumed.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Changes and Re-edits
//! The engine loads the sale's [`SaleState`], asks it for a [`Transition`]
//! or an [`EditPlan`](caja_core::EditPlan), and carries out the stock
//! effect line by line through the [`StockLedger`].

use caja_core::{
    Cart, CoreError, PaymentMethod, Sale, SaleLine, SaleState, SaleStatus, StockEffect,
    Transition, User,
};
use caja_core::NewSaleLine;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::{DbError, SaleResult};
use crate::ledger::StockLedger;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;

/// Orchestrates sale writes and their stock movements.
#[derive(Debug, Clone)]
pub struct SaleEngine {
    pool: SqlitePool,
}

impl SaleEngine {
    pub fn new(pool: SqlitePool) -> Self {
        SaleEngine { pool }
    }

    /// Turns a cart into a sale. Stock is always taken at checkout, so a
    /// PENDING sale starts out reserved.
    pub async fn checkout(
        &self,
        cart: &Cart,
        payment_method: PaymentMethod,
        status: SaleStatus,
        user_id: Option<i64>,
    ) -> SaleResult<Sale> {
        cart.validate_for_checkout()?;
        let state = SaleState::at_checkout(status)?;

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let number = SaleRepository::next_number(&mut *tx).await?;
        let sale_id =
            SaleRepository::insert_header(&mut *tx, number, payment_method, state, user_id, now)
                .await?;

        write_lines(&mut *tx, sale_id, cart, state.stock_deducted()).await?;

        let mut sale = load(&mut *tx, sale_id).await?;
        sale.total = SaleRepository::lines_total(&mut *tx, sale_id).await?.amount();
        sale.updated_at = now;
        SaleRepository::write_header(&mut *tx, &sale).await?;

        tx.commit().await?;

        info!(
            sale_id,
            number = %sale.number,
            status = %sale.status(),
            total = sale.total,
            items = cart.len(),
            "Sale checked out"
        );
        Ok(sale)
    }

    /// Moves a sale to `to`, optionally changing the payment method.
    ///
    /// Requesting the current status only updates the payment method.
    pub async fn change_status(
        &self,
        sale_id: i64,
        to: SaleStatus,
        payment_method: Option<PaymentMethod>,
    ) -> SaleResult<Sale> {
        let mut tx = self.pool.begin().await?;
        SaleRepository::lock_for_update(&mut *tx, sale_id).await?;

        let mut sale = load(&mut *tx, sale_id).await?;
        let transition = sale.state.transition(to).map_err(|e| {
            warn!(sale_id, from = %sale.status(), to = %to, error = %e, "Status change rejected");
            e
        })?;
        if transition.is_noop() {
            debug!(sale_id, status = %to, "Status unchanged");
        }

        apply_stock_effect(&mut *tx, sale_id, &transition).await?;

        sale.state = transition.to;
        if let Some(method) = payment_method {
            sale.payment_method = method;
        }
        sale.updated_at = Utc::now();
        SaleRepository::write_header(&mut *tx, &sale).await?;

        tx.commit().await?;

        info!(
            sale_id,
            from = %transition.from.status(),
            to = %sale.status(),
            stock = ?transition.stock,
            "Sale status changed"
        );
        Ok(sale)
    }

    /// Cancels a sale, returning its stock if it held any.
    pub async fn cancel(&self, sale_id: i64) -> SaleResult<Sale> {
        self.change_status(sale_id, SaleStatus::Cancelled, None).await
    }

    /// Replaces every line of a sale with `cart`.
    ///
    /// Stock held by the old lines is returned before the new cart is
    /// checked, so the new lines can reuse it. Only admins may re-edit.
    pub async fn edit(
        &self,
        sale_id: i64,
        cart: &Cart,
        payment_method: PaymentMethod,
        status: SaleStatus,
        actor: &User,
    ) -> SaleResult<Sale> {
        actor.require_admin("Editing a sale")?;

        let mut tx = self.pool.begin().await?;
        SaleRepository::lock_for_update(&mut *tx, sale_id).await?;

        let mut sale = load(&mut *tx, sale_id).await?;
        let plan = sale.state.plan_edit(status).map_err(|e| {
            warn!(sale_id, from = %sale.status(), to = %status, error = %e, "Re-edit rejected");
            e
        })?;

        if plan.restore_existing {
            let old_lines = SaleRepository::lines_in(&mut *tx, sale_id).await?;
            restore_lines(&mut *tx, &old_lines).await?;
        }
        SaleRepository::delete_lines(&mut *tx, sale_id).await?;

        cart.validate_for_checkout()?;
        write_lines(&mut *tx, sale_id, cart, plan.deduct_new).await?;

        sale.total = SaleRepository::lines_total(&mut *tx, sale_id).await?.amount();
        sale.state = plan.next;
        sale.payment_method = payment_method;
        sale.is_modified = true;
        sale.updated_at = Utc::now();
        SaleRepository::write_header(&mut *tx, &sale).await?;

        tx.commit().await?;

        info!(
            sale_id,
            editor = actor.id,
            status = %sale.status(),
            total = sale.total,
            "Sale re-edited"
        );
        Ok(sale)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

async fn load(conn: &mut SqliteConnection, sale_id: i64) -> SaleResult<Sale> {
    SaleRepository::find_in(conn, sale_id)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(sale_id).into())
}

/// Inserts one line per cart item, taking stock when `deduct` is set and
/// otherwise only checking that enough is on hand.
///
/// Without deduction the check runs against the quantity summed over every
/// row of the same product.
async fn write_lines(
    conn: &mut SqliteConnection,
    sale_id: i64,
    cart: &Cart,
    deduct: bool,
) -> SaleResult<()> {
    let mut wanted: HashMap<i64, i64> = HashMap::new();

    for item in cart.items() {
        let product = ProductRepository::find(&mut *conn, item.product_id)
            .await?
            .ok_or(CoreError::ProductNotFound(item.product_id))?;

        if deduct {
            StockLedger::deduct(&mut *conn, product.id, item.quantity).await?;
        } else {
            let requested = wanted.entry(product.id).or_insert(0);
            *requested += item.quantity;
            if !product.has_stock_for(*requested) {
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.stock,
                    requested: *requested,
                }
                .into());
            }
        }

        let line = NewSaleLine::new(&product, item.quantity, item.price)?;
        SaleRepository::insert_line(&mut *conn, sale_id, &line).await?;
    }
    Ok(())
}

async fn apply_stock_effect(
    conn: &mut SqliteConnection,
    sale_id: i64,
    transition: &Transition,
) -> SaleResult<()> {
    if transition.stock == StockEffect::None {
        return Ok(());
    }

    let lines = SaleRepository::lines_in(&mut *conn, sale_id).await?;
    if lines.is_empty() {
        return Err(DbError::Corrupt(format!("sale {sale_id} has no lines")).into());
    }

    match transition.stock {
        StockEffect::Deduct => {
            for line in &lines {
                StockLedger::deduct(&mut *conn, line.product_id, line.quantity).await?;
            }
        }
        StockEffect::Restore => restore_lines(&mut *conn, &lines).await?,
        StockEffect::None => {}
    }
    Ok(())
}

async fn restore_lines(conn: &mut SqliteConnection, lines: &[SaleLine]) -> SaleResult<()> {
    for line in lines {
        StockLedger::restore(&mut *conn, line.product_id, line.quantity).await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
