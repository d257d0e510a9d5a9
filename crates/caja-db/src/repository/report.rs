//! # Report Repository
//!
//! Dashboard aggregates over COMPLETED sales. Window sums and best sellers
//! are plain SQL; profit needs each line netted of tax, so the rows are
//! loaded and ranked with [`rank_by_profit`].

use caja_core::report::{
    rank_by_profit, Dashboard, LowStockProduct, ProfitableProduct, ReportWindow, SalesSummary,
    TopProduct, TopProducts, DASHBOARD_LIST_LEN,
};
use caja_core::{Product, SaleLine, SaleStatus};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Revenue per window ending at `now`.
    pub async fn sales_summary(&self, now: DateTime<Utc>) -> DbResult<SalesSummary> {
        let mut summary = SalesSummary::default();
        for window in ReportWindow::ALL {
            let total: i64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(total), 0) FROM sales
                 WHERE status = ?1 AND created_at >= ?2",
            )
            .bind(SaleStatus::Completed)
            .bind(window.start(now))
            .fetch_one(&self.pool)
            .await?;
            summary.set(window, total);
        }
        Ok(summary)
    }

    /// Best seller by units per window ending at `now`.
    pub async fn top_products(&self, now: DateTime<Utc>) -> DbResult<TopProducts> {
        let mut top = TopProducts::default();
        for window in ReportWindow::ALL {
            let best = sqlx::query_as::<_, TopProduct>(
                "SELECT l.product_id, p.name, SUM(l.quantity) AS quantity
                 FROM sale_lines l
                 JOIN sales s ON s.id = l.sale_id
                 JOIN products p ON p.id = l.product_id
                 WHERE s.status = ?1 AND s.created_at >= ?2
                 GROUP BY l.product_id, p.name
                 ORDER BY quantity DESC, l.product_id
                 LIMIT 1",
            )
            .bind(SaleStatus::Completed)
            .bind(window.start(now))
            .fetch_optional(&self.pool)
            .await?;
            top.set(window, best);
        }
        Ok(top)
    }

    /// Most profitable products across every COMPLETED sale.
    pub async fn top_profitable_products(&self, limit: usize) -> DbResult<Vec<ProfitableProduct>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            "SELECT l.id, l.sale_id, l.product_id, l.quantity, l.unit_price,
                    l.purchase_price, l.subtotal, l.is_tax_included
             FROM sale_lines l
             JOIN sales s ON s.id = l.sale_id
             WHERE s.status = ?1",
        )
        .bind(SaleStatus::Completed)
        .fetch_all(&self.pool)
        .await?;

        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let products: HashMap<i64, Product> = sqlx::query_as::<_, Product>(
            "SELECT id, name, brand, category_id, description, purchase_price,
                    is_purchase_with_tax, sale_price, is_sale_with_tax, stock,
                    is_active, created_at, updated_at
             FROM products
             WHERE id IN (SELECT DISTINCT product_id FROM sale_lines)",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

        debug!(lines = lines.len(), products = products.len(), "Ranking by profit");

        let pairs = lines
            .iter()
            .filter_map(|line| products.get(&line.product_id).map(|p| (line, p)));
        rank_by_profit(pairs, limit).map_err(|e| DbError::Corrupt(e.to_string()))
    }

    /// Active products that are running out, lowest stock first.
    ///
    /// Sold-out products are left out; they no longer show in search.
    pub async fn low_stock_products(&self, limit: usize) -> DbResult<Vec<LowStockProduct>> {
        let products = sqlx::query_as::<_, LowStockProduct>(
            "SELECT id, name, brand, stock FROM products
             WHERE is_active = 1 AND stock > 0
             ORDER BY stock ASC, name
             LIMIT ?1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Everything the dashboard shows, as of `now`.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> DbResult<Dashboard> {
        Ok(Dashboard {
            sales: self.sales_summary(now).await?,
            top_products: self.top_products(now).await?,
            top_profitable_products: self.top_profitable_products(DASHBOARD_LIST_LEN).await?,
            low_stock_products: self.low_stock_products(DASHBOARD_LIST_LEN).await?,
        })
    }
}
