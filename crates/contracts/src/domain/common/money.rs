//! Fixed-point money helpers.
//!
//! Amounts are `Decimal` values with two fractional digits. The database stores
//! them as integer minor units (kuruş) so that SQL sums stay exact.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Number of fractional digits of every stored amount
pub const MONEY_SCALE: u32 = 2;

/// Zero amount with the money scale
pub fn zero() -> Decimal {
    Decimal::new(0, MONEY_SCALE)
}

/// Rescale an amount to exactly two fractional digits.
///
/// Only used on values that already have at most two significant fractional
/// digits, so no rounding happens.
pub fn normalize(value: Decimal) -> Decimal {
    let mut value = value.round_dp(MONEY_SCALE);
    value.rescale(MONEY_SCALE);
    value
}

/// True when the amount has no more than two significant fractional digits
pub fn has_money_scale(value: Decimal) -> bool {
    value.normalize().scale() <= MONEY_SCALE
}

/// Convert an amount into minor units.
///
/// Returns `None` when the value carries more than two fractional digits or does
/// not fit into an `i64`.
pub fn to_minor_units(value: Decimal) -> Option<i64> {
    if !has_money_scale(value) {
        return None;
    }
    value.checked_mul(Decimal::ONE_HUNDRED)?.trunc().to_i64()
}

/// Build an amount from stored minor units
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MONEY_SCALE)
}
