//! # Pricing and Tax
//!
//! Converts tax-inclusive amounts to net amounts and derives margins and
//! per-line profit.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  VAT is a flat 19%.                                                     │
//! │                                                                         │
//! │    gross 11.900 ──► net_price(.., true)  ──► 10.000                     │
//! │    net   10.000 ──► net_price(.., false) ──► 10.000                     │
//! │                                                                         │
//! │    margin = (sale_net - purchase_net) * 100 / purchase_net              │
//! │    profit = (unit_net - purchase_net) * quantity                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All functions are pure. Only `line_profit` can fail, on overflow.

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{Product, SaleLine};

/// VAT rate in whole percent.
pub const VAT_PERCENT: i64 = 19;

/// Removes VAT from `amount` when `tax_included`, rounding down.
///
/// ```rust
/// use caja_core::money::Money;
/// use caja_core::pricing::net_price;
///
/// assert_eq!(net_price(Money::from_minor(11900), true).amount(), 10000);
/// assert_eq!(net_price(Money::from_minor(10000), false).amount(), 10000);
/// ```
pub fn net_price(amount: Money, tax_included: bool) -> Money {
    if !tax_included {
        return amount;
    }
    let divisor = 100 + VAT_PERCENT;
    let raw = amount.amount() as i128 * 100;
    // floor, not truncation, so a negative gross still rounds down
    Money::from_minor(raw.div_euclid(divisor as i128) as i64)
}

/// Margin of `sale_net` over `purchase_net` in whole percent.
///
/// Truncates toward zero. A zero purchase price yields 0 rather than
/// dividing by zero.
pub fn profit_margin(purchase_net: Money, sale_net: Money) -> i64 {
    if purchase_net.is_zero() {
        return 0;
    }
    let diff = (sale_net - purchase_net).amount() as i128;
    ((diff * 100) / purchase_net.amount() as i128) as i64
}

/// Profit earned by one sale line.
///
/// The unit price is netted with the line's own tax snapshot and the
/// purchase price with the product's purchase tax flag.
pub fn line_profit(line: &SaleLine, product: &Product) -> CoreResult<Money> {
    let unit_net = net_price(line.unit_price(), line.is_tax_included);
    let purchase_net = net_price(
        Money::from_minor(line.purchase_price),
        product.is_purchase_with_tax,
    );
    (unit_net - purchase_net).multiply_quantity(line.quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::product;

    #[test]
    fn test_net_price_removes_vat() {
        assert_eq!(net_price(Money::from_minor(11900), true).amount(), 10000);
        assert_eq!(net_price(Money::from_minor(10000), false).amount(), 10000);
        // 1000 / 1.19 = 840.33..
        assert_eq!(net_price(Money::from_minor(1000), true).amount(), 840);
        assert_eq!(net_price(Money::zero(), true).amount(), 0);
    }

    #[test]
    fn test_profit_margin() {
        assert_eq!(profit_margin(Money::from_minor(10000), Money::from_minor(15000)), 50);
        assert_eq!(profit_margin(Money::zero(), Money::from_minor(15000)), 0);
        assert_eq!(profit_margin(Money::from_minor(3000), Money::from_minor(4000)), 33);
        assert_eq!(profit_margin(Money::from_minor(10000), Money::from_minor(9000)), -10);
    }

    #[test]
    fn test_line_profit_uses_snapshots() {
        let mut p = product(1, 11900, 10);
        p.purchase_price = 5950;
        p.is_purchase_with_tax = true;

        let line = SaleLine {
            id: 1,
            sale_id: 1,
            product_id: 1,
            quantity: 2,
            unit_price: 11900,
            purchase_price: 5950,
            subtotal: 23800,
            is_tax_included: true,
        };
        // (10000 - 5000) * 2
        assert_eq!(line_profit(&line, &p).unwrap().amount(), 10000);

        let untaxed = SaleLine {
            is_tax_included: false,
            ..line
        };
        // (11900 - 5000) * 2
        assert_eq!(line_profit(&untaxed, &p).unwrap().amount(), 13800);
    }
}
