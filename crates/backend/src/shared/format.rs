use rust_decimal::Decimal;

use contracts::domain::common::money;

/// Integer with dot thousands separators
///
/// # Examples
/// ```ignore
/// assert_eq!(format_number(1234567), "1.234.567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// Amount in the shop's notation: dot thousands, comma decimals, lira sign.
/// Used in activity log details, for example `1.234,50 ₺`.
pub fn format_money(value: Decimal) -> String {
    let value = money::normalize(value);
    let text = value.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{},{} ₺", sign, group_thousands(whole), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(1234567890), "1.234.567.890");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(0)), "0,00 ₺");
        assert_eq!(format_money(dec!(1234.5)), "1.234,50 ₺");
        assert_eq!(format_money(dec!(-10)), "-10,00 ₺");
        assert_eq!(format_money(dec!(999999.99)), "999.999,99 ₺");
    }
}
