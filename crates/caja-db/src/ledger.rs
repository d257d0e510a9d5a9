//! # Stock Ledger
//!
//! The only code that changes `products.stock`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleEngine (holds the transaction)                                    │
//! │       │                                                                 │
//! │       ├── deduct(&mut tx, product, qty)                                │
//! │       │      UPDATE products SET stock = stock - qty                   │
//! │       │      WHERE id = ? AND stock >= qty                             │
//! │       │      0 rows? ──► re-read ──► InsufficientStock | ProductNotFound│
//! │       │                                                                 │
//! │       └── restore(&mut tx, product, qty)                               │
//! │              UPDATE products SET stock = stock + qty WHERE id = ?      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The check and the write are one statement, so two concurrent checkouts
//! cannot both take the last unit. Restores are unbounded; the engine only
//! asks for one when the sale's state says stock is held.

use caja_core::CoreError;
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use crate::error::{DbError, SaleResult};

pub struct StockLedger;

impl StockLedger {
    /// Takes `qty` units of `product_id` off the shelf.
    ///
    /// Fails without writing when fewer than `qty` units are on hand.
    pub async fn deduct(conn: &mut SqliteConnection, product_id: i64, qty: i64) -> SaleResult<()> {
        let result = sqlx::query(
            "UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2",
        )
        .bind(product_id)
        .bind(qty)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 1 {
            debug!(product_id, qty, "Stock deducted");
            return Ok(());
        }

        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await?;

        match row {
            Some((product, available)) => {
                warn!(product_id, available, requested = qty, "Insufficient stock");
                Err(CoreError::InsufficientStock {
                    product,
                    available,
                    requested: qty,
                }
                .into())
            }
            None => Err(CoreError::ProductNotFound(product_id).into()),
        }
    }

    /// Puts `qty` units of `product_id` back on the shelf.
    pub async fn restore(conn: &mut SqliteConnection, product_id: i64, qty: i64) -> SaleResult<()> {
        let result = sqlx::query("UPDATE products SET stock = stock + ?2 WHERE id = ?1")
            .bind(product_id)
            .bind(qty)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id).into());
        }

        debug!(product_id, qty, "Stock restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SaleError;
    use crate::repository::product::tests::new_product;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_deduct_and_restore() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(&new_product("Leche 1L", "Colun", 1190, 5))
            .await
            .unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        StockLedger::deduct(&mut tx, product.id, 3).await.unwrap();
        StockLedger::restore(&mut tx, product.id, 1).await.unwrap();
        tx.commit().await.unwrap();

        let stock = db.products().get_by_id(product.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 3);
    }

    #[tokio::test]
    async fn test_deduct_reports_shortage_without_writing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(&new_product("Leche 1L", "Colun", 1190, 2))
            .await
            .unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let err = StockLedger::deduct(&mut tx, product.id, 3).await.unwrap_err();
        tx.rollback().await.unwrap();

        match err {
            SaleError::Rule(CoreError::InsufficientStock {
                product: name,
                available,
                requested,
            }) => {
                assert_eq!(name, "Leche 1L");
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let stock = db.products().get_by_id(product.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 2);
    }

    #[tokio::test]
    async fn test_deduct_unknown_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut tx = db.pool().begin().await.unwrap();
        let err = StockLedger::deduct(&mut tx, 42, 1).await.unwrap_err();
        assert!(matches!(err, SaleError::Rule(CoreError::ProductNotFound(42))));
    }
}
