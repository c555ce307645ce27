//! Financial derivation shared by work orders and accessory sales.
//!
//! Every mutation path of both aggregates recomputes its stored totals through
//! [`derive_financials`]; nothing else writes cost, revenue or margin.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

use super::money;

/// A priced line (part, labour or accessory item)
pub trait LineItem {
    fn quantity(&self) -> i32;
    fn unit_cost(&self) -> Decimal;
    fn unit_sale_price(&self) -> Decimal;

    /// quantity × unit cost
    fn line_cost(&self) -> Decimal {
        Decimal::from(self.quantity()) * self.unit_cost()
    }

    /// quantity × unit sale price
    fn line_sale(&self) -> Decimal {
        Decimal::from(self.quantity()) * self.unit_sale_price()
    }
}

/// Derived totals of a set of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Financials {
    pub total_cost: Decimal,
    pub total_sale: Decimal,
    pub margin: Decimal,
}

impl Financials {
    pub fn zero() -> Self {
        Self {
            total_cost: money::zero(),
            total_sale: money::zero(),
            margin: money::zero(),
        }
    }

    /// Totals from a cost and a sale figure; the margin is always their difference
    pub fn from_totals(total_cost: Decimal, total_sale: Decimal) -> Self {
        Self {
            total_cost: money::normalize(total_cost),
            total_sale: money::normalize(total_sale),
            margin: money::normalize(total_sale - total_cost),
        }
    }

    /// margin / revenue × 100, 0 when there is no revenue
    pub fn margin_percent(&self) -> Decimal {
        margin_percent(self.margin, self.total_sale)
    }
}

impl Default for Financials {
    fn default() -> Self {
        Self::zero()
    }
}

impl AddAssign for Financials {
    fn add_assign(&mut self, rhs: Self) {
        self.total_cost += rhs.total_cost;
        self.total_sale += rhs.total_sale;
        self.margin += rhs.margin;
    }
}

/// Sum cost and sale over the lines and derive the margin.
///
/// The actual fee of a work order is the total sale; there is no override path.
pub fn derive_financials<'a, T, I>(items: I) -> Financials
where
    T: LineItem + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let (cost, sale) = items
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(cost, sale), item| {
            (cost + item.line_cost(), sale + item.line_sale())
        });
    Financials::from_totals(cost, sale)
}

/// Percentage of margin over revenue rounded to two digits.
/// Zero revenue yields 0 instead of a division error.
pub fn margin_percent(margin: Decimal, revenue: Decimal) -> Decimal {
    if revenue.is_zero() {
        return money::zero();
    }
    money::normalize(margin * Decimal::ONE_HUNDRED / revenue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct Line(i32, Decimal, Decimal);

    impl LineItem for Line {
        fn quantity(&self) -> i32 {
            self.0
        }
        fn unit_cost(&self) -> Decimal {
            self.1
        }
        fn unit_sale_price(&self) -> Decimal {
            self.2
        }
    }

    #[test]
    fn derives_cost_sale_and_margin() {
        let lines = vec![
            Line(2, dec!(10), dec!(25)),
            Line(1, dec!(100), dec!(80)),
        ];
        let f = derive_financials(&lines);
        assert_eq!(f.total_cost, dec!(120));
        assert_eq!(f.total_sale, dec!(130));
        assert_eq!(f.margin, dec!(10));
        assert_eq!(f.total_sale.to_string(), "130.00");
    }

    #[test]
    fn empty_lines_are_zero() {
        let lines: Vec<Line> = Vec::new();
        assert_eq!(derive_financials(&lines), Financials::zero());
    }

    #[test]
    fn repeated_cents_do_not_drift() {
        let lines: Vec<Line> = (0..1000).map(|_| Line(3, dec!(0.10), dec!(0.20))).collect();
        let f = derive_financials(&lines);
        assert_eq!(f.total_cost, dec!(300.00));
        assert_eq!(f.total_sale, dec!(600.00));
        assert_eq!(f.margin, f.total_sale - f.total_cost);
    }

    #[test]
    fn margin_percent_guards_zero_revenue() {
        assert_eq!(margin_percent(dec!(0), dec!(0)), dec!(0));
        assert_eq!(margin_percent(dec!(-15), dec!(0)), dec!(0));
        assert_eq!(margin_percent(dec!(30), dec!(50)), dec!(60));
        assert_eq!(margin_percent(dec!(10), dec!(130)), dec!(7.69));
    }

    #[test]
    fn financials_accumulate() {
        let mut total = Financials::zero();
        total += Financials::from_totals(dec!(20), dec!(50));
        total += Financials::from_totals(dec!(100), dec!(80));
        assert_eq!(total.margin, dec!(10));
        assert_eq!(total.total_cost, dec!(120));
    }
}
