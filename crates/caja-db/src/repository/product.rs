//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier types: "coca"                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize_search_term ── fewer than 2 chars? ──► []                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search_text LIKE '%coca%'   (lowercased name + brand)                 │
//! │  AND is_active = 1 AND stock > 0                                       │
//! │  ORDER BY name                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [Coca-Cola 1.5L, Coca-Cola Zero 3L]                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is never updated here. See [`StockLedger`](crate::ledger::StockLedger).

use caja_core::validation::{
    normalize_search_term, search_key, validate_price, validate_product_name, validate_stock,
};
use caja_core::{CoreError, Product};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = r#"
    id, name, brand, category_id, description,
    purchase_price, is_purchase_with_tax,
    sale_price, is_sale_with_tax,
    stock, is_active, created_at, updated_at
"#;

/// Fields needed to create a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub purchase_price: i64,
    pub is_purchase_with_tax: bool,
    pub sale_price: i64,
    pub is_sale_with_tax: bool,
    pub stock: i64,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_product_name(&self.name)?;
        validate_price("purchase_price", self.purchase_price)?;
        validate_price("sale_price", self.sale_price)?;
        validate_stock(self.stock)?;
        Ok(())
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Active, in-stock products whose name or brand contains `term`.
    ///
    /// Matching ignores case, accented letters included: the term and the
    /// stored `search_text` are both lowercased in Rust. Terms shorter than
    /// two characters return an empty list.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Product>> {
        let Some(term) = normalize_search_term(term) else {
            return Ok(Vec::new());
        };

        debug!(term = %term, "Searching products");

        let pattern = format!("%{}%", escape_like(&term));
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE is_active = 1 AND stock > 0
               AND search_text LIKE ?1 ESCAPE '\\'
             ORDER BY name"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Gets a product by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::find(&mut *conn, id).await
    }

    /// Looks a product up on an open connection, typically a transaction.
    pub(crate) async fn find(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(product)
    }

    /// Inserts a product and returns it with its generated id.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        product
            .validate()
            .map_err(|e| DbError::Invalid(e.to_string()))?;

        debug!(name = %product.name, "Inserting product");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO products (
                name, brand, category_id, description,
                purchase_price, is_purchase_with_tax,
                sale_price, is_sale_with_tax,
                stock, is_active, search_text, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?11, ?11)
             RETURNING {PRODUCT_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Product>(&sql)
            .bind(&product.name)
            .bind(&product.brand)
            .bind(product.category_id)
            .bind(&product.description)
            .bind(product.purchase_price)
            .bind(product.is_purchase_with_tax)
            .bind(product.sale_price)
            .bind(product.is_sale_with_tax)
            .bind(product.stock)
            .bind(search_key(&product.name, &product.brand))
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(inserted)
    }

    /// Hides or shows a product in search and reports.
    pub async fn set_active(&self, id: i64, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Escapes `LIKE` wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================
