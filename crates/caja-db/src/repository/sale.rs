//! # Sale Repository
//!
//! Reads of sales and their lines, and the row-level writes the
//! [`SaleEngine`](crate::engine::SaleEngine) performs inside its transaction.
//!
//! ## Who Writes What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SaleRepository (pool)             SaleRepository::*_in (&mut tx)      │
//! │  ─────────────────────             ───────────────────────────────      │
//! │  get_by_id                         next_number                          │
//! │  lines / lines_detailed            insert_header                        │
//! │  list(filter)                      lock_for_update                      │
//! │                                    insert_line                          │
//! │  count                             delete_lines                         │
//! │                                    write_header                         │
//! │                                                                         │
//! │  Nothing outside the engine calls the right-hand column.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use caja_core::types::validate_header;
use caja_core::{
    Money, NewSaleLine, PaymentMethod, Sale, SaleLine, SaleNumber, SaleRecord, SaleState,
    SaleStatus,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult, SaleResult};

const SALE_COLUMNS: &str = r#"
    id, number, payment_method, status, is_stock_deducted,
    total, user_id, is_modified, created_at, updated_at
"#;

const LINE_COLUMNS: &str = r#"
    id, sale_id, product_id, quantity, unit_price,
    purchase_price, subtotal, is_tax_included
"#;

/// A sale line joined with the product's current name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SaleLineDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub line: SaleLine,
    pub product_name: String,
}

/// Default number of sales a listing returns.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// Largest listing a caller may ask for.
pub const MAX_LIST_LIMIT: u32 = 200;

/// Narrows a sale listing. Unset fields match every sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleFilter {
    /// Calendar day of `created_at`, in UTC.
    pub date: Option<NaiveDate>,
    pub status: Option<SaleStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub limit: u32,
}

impl Default for SaleFilter {
    fn default() -> Self {
        SaleFilter {
            date: None,
            status: None,
            payment_method: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl SaleFilter {
    /// `[midnight, next midnight)` of the filtered day.
    fn day_range(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match self.date {
            Some(date) => {
                let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
                (Some(start), Some(start + Duration::days(1)))
            }
            None => (None, None),
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by id.
    ///
    /// A row whose status and stock flag disagree fails with
    /// `InvalidSaleState`.
    pub async fn get_by_id(&self, id: i64) -> SaleResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_in(&mut *conn, id).await
    }

    /// Lines of a sale in insertion order.
    pub async fn lines(&self, sale_id: i64) -> DbResult<Vec<SaleLine>> {
        let mut conn = self.pool.acquire().await?;
        Self::lines_in(&mut *conn, sale_id).await
    }

    /// Lines of a sale with product names, for display.
    pub async fn lines_detailed(&self, sale_id: i64) -> DbResult<Vec<SaleLineDetail>> {
        let lines = sqlx::query_as::<_, SaleLineDetail>(
            "SELECT l.id, l.sale_id, l.product_id, l.quantity, l.unit_price,
                    l.purchase_price, l.subtotal, l.is_tax_included,
                    p.name AS product_name
             FROM sale_lines l
             JOIN products p ON p.id = l.product_id
             WHERE l.sale_id = ?1
             ORDER BY l.id",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    /// Sales matching `filter`, newest first.
    ///
    /// The limit is clamped to `1..=MAX_LIST_LIMIT`.
    pub async fn list(&self, filter: &SaleFilter) -> SaleResult<Vec<Sale>> {
        let (from, until) = filter.day_range();
        let limit = filter.limit.clamp(1, MAX_LIST_LIMIT);
        debug!(?filter, "Listing sales");

        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales
             WHERE (?1 IS NULL OR created_at >= ?1)
               AND (?2 IS NULL OR created_at < ?2)
               AND (?3 IS NULL OR status = ?3)
               AND (?4 IS NULL OR payment_method = ?4)
             ORDER BY created_at DESC, id DESC
             LIMIT ?5"
        );
        let records = sqlx::query_as::<_, SaleRecord>(&sql)
            .bind(from)
            .bind(until)
            .bind(filter.status)
            .bind(filter.payment_method)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let sales = records
            .into_iter()
            .map(Sale::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sales)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // In-transaction operations (engine only)
    // =========================================================================

    pub(crate) async fn find_in(conn: &mut SqliteConnection, id: i64) -> SaleResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let record = sqlx::query_as::<_, SaleRecord>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        match record {
            Some(record) => Ok(Some(Sale::try_from(record)?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn lines_in(
        conn: &mut SqliteConnection,
        sale_id: i64,
    ) -> DbResult<Vec<SaleLine>> {
        let sql = format!("SELECT {LINE_COLUMNS} FROM sale_lines WHERE sale_id = ?1 ORDER BY id");
        let lines = sqlx::query_as::<_, SaleLine>(&sql)
            .bind(sale_id)
            .fetch_all(conn)
            .await?;
        Ok(lines)
    }

    /// Takes SQLite's write lock before anything is read.
    ///
    /// A transaction that reads first and writes later cannot wait for a
    /// concurrent writer in WAL mode; it fails with `SQLITE_BUSY_SNAPSHOT`.
    /// Writing first makes it wait out the busy timeout instead.
    pub(crate) async fn lock_for_update(conn: &mut SqliteConnection, id: i64) -> DbResult<()> {
        sqlx::query("UPDATE sales SET updated_at = updated_at WHERE id = ?1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Advances the sale counter and returns the new number.
    ///
    /// The UPDATE takes SQLite's write lock, so numbers are handed out one
    /// transaction at a time.
    pub(crate) async fn next_number(conn: &mut SqliteConnection) -> DbResult<SaleNumber> {
        let value: i64 = sqlx::query_scalar(
            "UPDATE sale_sequence SET last_value = last_value + 1 WHERE id = 1 RETURNING last_value",
        )
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DbError::Corrupt("sale_sequence row is missing".to_string()))?;

        Ok(SaleNumber::new(value))
    }

    /// Inserts a header with a zero total; the engine fills it in once the
    /// lines exist.
    pub(crate) async fn insert_header(
        conn: &mut SqliteConnection,
        number: SaleNumber,
        payment_method: PaymentMethod,
        state: SaleState,
        user_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> DbResult<i64> {
        debug!(number = %number, "Inserting sale header");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO sales (
                number, payment_method, status, is_stock_deducted,
                total, user_id, is_modified, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, 0, ?5, 0, ?6, ?6)
             RETURNING id",
        )
        .bind(number.to_string())
        .bind(payment_method)
        .bind(state.status())
        .bind(state.stock_deducted())
        .bind(user_id)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    pub(crate) async fn insert_line(
        conn: &mut SqliteConnection,
        sale_id: i64,
        line: &NewSaleLine,
    ) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO sale_lines (
                sale_id, product_id, quantity, unit_price,
                purchase_price, subtotal, is_tax_included
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(sale_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.purchase_price)
        .bind(line.subtotal())
        .bind(line.is_tax_included)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub(crate) async fn delete_lines(conn: &mut SqliteConnection, sale_id: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sale_lines WHERE sale_id = ?1")
            .bind(sale_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Sum of line subtotals, the only source of a sale's total.
    pub(crate) async fn lines_total(conn: &mut SqliteConnection, sale_id: i64) -> DbResult<Money> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(subtotal), 0) FROM sale_lines WHERE sale_id = ?1")
                .bind(sale_id)
                .fetch_one(conn)
                .await?;
        Ok(Money::from_minor(total))
    }

    /// Writes the mutable header fields of `sale`.
    ///
    /// Rejects a COMPLETED header without a positive total before touching
    /// the row.
    pub(crate) async fn write_header(conn: &mut SqliteConnection, sale: &Sale) -> SaleResult<()> {
        validate_header(sale.status(), sale.total())?;

        let result = sqlx::query(
            "UPDATE sales SET
                payment_method = ?2,
                status = ?3,
                is_stock_deducted = ?4,
                total = ?5,
                is_modified = ?6,
                updated_at = ?7
             WHERE id = ?1",
        )
        .bind(sale.id)
        .bind(sale.payment_method)
        .bind(sale.status())
        .bind(sale.is_stock_deducted())
        .bind(sale.total)
        .bind(sale.is_modified)
        .bind(sale.updated_at)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", sale.id).into());
        }
        Ok(())
    }
}
