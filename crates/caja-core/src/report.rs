//! # Dashboard Reports
//!
//! Time windows and result shapes for the sales dashboard, plus the profit
//! ranking, which has to run in Rust because it nets prices line by line.
//!
//! ```text
//! now = 2024-03-15 14:30 UTC
//!
//!   Day   ──► 2024-03-15 00:00
//!   Week  ──► 2024-03-08 00:00   (today minus 7 days)
//!   Month ──► 2024-03-01 00:00
//!   Year  ──► 2024-01-01 00:00
//! ```

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::CoreResult;
use crate::money::Money;
use crate::pricing::line_profit;
use crate::types::{Product, SaleLine};

/// How many rows the ranked dashboard lists hold.
pub const DASHBOARD_LIST_LEN: usize = 5;

// =============================================================================
// Windows
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportWindow {
    Day,
    Week,
    Month,
    Year,
}

impl ReportWindow {
    pub const ALL: [ReportWindow; 4] = [
        ReportWindow::Day,
        ReportWindow::Week,
        ReportWindow::Month,
        ReportWindow::Year,
    ];

    /// First instant included in the window, at midnight UTC.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let date = match self {
            ReportWindow::Day => today,
            ReportWindow::Week => today - Duration::days(7),
            ReportWindow::Month => first_of(today.year(), today.month()).unwrap_or(today),
            ReportWindow::Year => first_of(today.year(), 1).unwrap_or(today),
        };
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
    }
}

fn first_of(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

// =============================================================================
// Result Shapes
// =============================================================================

/// Revenue of COMPLETED sales per window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub day: i64,
    pub week: i64,
    pub month: i64,
    pub year: i64,
}

impl SalesSummary {
    pub fn set(&mut self, window: ReportWindow, total: i64) {
        match window {
            ReportWindow::Day => self.day = total,
            ReportWindow::Week => self.week = total,
            ReportWindow::Month => self.month = total,
            ReportWindow::Year => self.year = total,
        }
    }
}

/// Best-selling product of a window, by units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopProduct {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
}

/// Best seller per window; `None` when nothing sold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopProducts {
    pub day: Option<TopProduct>,
    pub week: Option<TopProduct>,
    pub month: Option<TopProduct>,
    pub year: Option<TopProduct>,
}

impl TopProducts {
    pub fn set(&mut self, window: ReportWindow, top: Option<TopProduct>) {
        match window {
            ReportWindow::Day => self.day = top,
            ReportWindow::Week => self.week = top,
            ReportWindow::Month => self.month = top,
            ReportWindow::Year => self.year = top,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitableProduct {
    pub product_id: i64,
    pub name: String,
    pub profit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LowStockProduct {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub stock: i64,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub sales: SalesSummary,
    pub top_products: TopProducts,
    pub top_profitable_products: Vec<ProfitableProduct>,
    pub low_stock_products: Vec<LowStockProduct>,
}

// =============================================================================
// Profit Ranking
// =============================================================================

/// Sums [`line_profit`] per product and keeps the `limit` most profitable.
///
/// Ties are broken by product id so the order is stable.
pub fn rank_by_profit<'a, I>(lines: I, limit: usize) -> CoreResult<Vec<ProfitableProduct>>
where
    I: IntoIterator<Item = (&'a SaleLine, &'a Product)>,
{
    let mut totals: HashMap<i64, (String, Money)> = HashMap::new();
    for (line, product) in lines {
        let entry = totals
            .entry(product.id)
            .or_insert_with(|| (product.name.clone(), Money::zero()));
        entry.1 = entry.1.checked_add(line_profit(line, product)?)?;
    }

    let mut ranked: Vec<ProfitableProduct> = totals
        .into_iter()
        .map(|(product_id, (name, profit))| ProfitableProduct {
            product_id,
            name,
            profit: profit.amount(),
        })
        .collect();
    ranked.sort_by(|a, b| b.profit.cmp(&a.profit).then(a.product_id.cmp(&b.product_id)));
    ranked.truncate(limit);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::product;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    #[test]
    fn test_window_starts() {
        let now = at(2024, 3, 15, 14);
        assert_eq!(ReportWindow::Day.start(now), Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(ReportWindow::Week.start(now), Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap());
        assert_eq!(ReportWindow::Month.start(now), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(ReportWindow::Year.start(now), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_week_crosses_month_boundary() {
        let now = at(2024, 3, 3, 9);
        assert_eq!(ReportWindow::Week.start(now), Utc.with_ymd_and_hms(2024, 2, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rank_by_profit() {
        let a = product(1, 11900, 10);
        let b = product(2, 11900, 10);
        let line = |product_id, quantity, unit_price| SaleLine {
            id: 0,
            sale_id: 0,
            product_id,
            quantity,
            unit_price,
            purchase_price: 5000,
            subtotal: quantity * unit_price,
            is_tax_included: true,
        };
        let l1 = line(1, 1, 11900); // 5000
        let l2 = line(2, 3, 11900); // 15000
        let l3 = line(1, 1, 11900); // 5000

        let ranked = rank_by_profit([(&l1, &a), (&l2, &b), (&l3, &a)], 5).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].product_id, 2);
        assert_eq!(ranked[0].profit, 15000);
        assert_eq!(ranked[1].profit, 10000);

        assert_eq!(rank_by_profit([(&l1, &a), (&l2, &b)], 1).unwrap().len(), 1);
    }
}
