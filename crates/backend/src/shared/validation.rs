//! Input checks shared by the services. Every failure names the offending wire field.

use contracts::domain::common::{money, DerivedFieldGuard, NewLineItemDto};
use rust_decimal::Decimal;

use crate::shared::error::{ServiceError, ServiceResult};

/// Trimmed, non-blank text
pub fn required_text(value: &str, field: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Trimmed text; blank becomes `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Apply a partial-update text field: absent keeps, blank clears
pub fn merge_text(target: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *target = optional_text(value);
    }
}

/// Non-negative amount with at most two fractional digits, rescaled to two
pub fn amount(value: Decimal, field: &str) -> ServiceResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ServiceError::validation(field, "must not be negative"));
    }
    scaled(value, field)
}

/// Strictly positive amount
pub fn positive_amount(value: Decimal, field: &str) -> ServiceResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(ServiceError::validation(field, "must be greater than zero"));
    }
    scaled(value, field)
}

fn scaled(value: Decimal, field: &str) -> ServiceResult<Decimal> {
    if money::to_minor_units(value).is_none() {
        return Err(ServiceError::validation(
            field,
            "must have at most two fractional digits",
        ));
    }
    Ok(money::normalize(value))
}

pub fn odometer(value: Option<i64>) -> ServiceResult<Option<i64>> {
    match value {
        Some(km) if km < 0 => Err(ServiceError::validation("km", "must not be negative")),
        other => Ok(other),
    }
}

/// Totals are computed by the server only
pub fn reject_derived_fields(guard: &DerivedFieldGuard) -> ServiceResult<()> {
    match guard.first_present() {
        Some(field) => Err(ServiceError::validation(
            field,
            "is computed by the server and cannot be set",
        )),
        None => Ok(()),
    }
}

/// Line item that passed validation, amounts rescaled to two digits
#[derive(Debug, Clone, PartialEq)]
pub struct ValidLine {
    pub code: Option<String>,
    pub name: String,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub unit_sale_price: Decimal,
}

pub fn line_item(item: &NewLineItemDto, prefix: &str) -> ServiceResult<ValidLine> {
    let field = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        }
    };

    let name = required_text(&item.name, &field("ad"))?;
    if item.quantity < 1 {
        return Err(ServiceError::validation(field("adet"), "must be at least 1"));
    }
    let unit_cost = amount(item.unit_cost, &field("birim_maliyet"))?;
    let unit_sale_price = amount(item.unit_sale_price, &field("birim_satis_fiyati"))?;

    Ok(ValidLine {
        code: optional_text(item.code.clone()),
        name,
        quantity: item.quantity,
        unit_cost,
        unit_sale_price,
    })
}

/// Validate a full `parcalar` list; fields are reported as `parcalar[i].ad`
pub fn line_items(items: &[NewLineItemDto]) -> ServiceResult<Vec<ValidLine>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| line_item(item, &format!("parcalar[{}]", i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn field_of(err: ServiceError) -> String {
        match err {
            ServiceError::ValidationFailed { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn blank_text_is_rejected_or_cleared() {
        assert_eq!(required_text("  Ali  ", "musteri_adi").unwrap(), "Ali");
        assert_eq!(field_of(required_text("   ", "musteri_adi").unwrap_err()), "musteri_adi");
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" 0555 ".into())), Some("0555".into()));

        let mut phone = Some("0555".to_string());
        merge_text(&mut phone, None);
        assert_eq!(phone.as_deref(), Some("0555"));
        merge_text(&mut phone, Some(String::new()));
        assert_eq!(phone, None);
    }

    #[test]
    fn amounts_need_money_scale() {
        assert_eq!(amount(dec!(10), "x").unwrap().to_string(), "10.00");
        assert_eq!(field_of(amount(dec!(-1), "tutar").unwrap_err()), "tutar");
        assert!(amount(dec!(1.001), "x").is_err());
        assert!(positive_amount(dec!(0), "tutar").is_err());
        assert!(positive_amount(dec!(0.01), "tutar").is_ok());
    }

    #[test]
    fn line_errors_point_at_the_item() {
        let items = vec![
            NewLineItemDto::new("Yağ filtresi", 2, dec!(10), dec!(25)),
            NewLineItemDto::new("Balata", 0, dec!(10), dec!(25)),
        ];
        assert_eq!(field_of(line_items(&items).unwrap_err()), "parcalar[1].adet");

        let unnamed = NewLineItemDto::new(" ", 1, dec!(1), dec!(1));
        assert_eq!(field_of(line_item(&unnamed, "").unwrap_err()), "ad");
    }

    #[test]
    fn derived_fields_are_refused() {
        let guard = DerivedFieldGuard {
            margin: Some(serde_json::json!(5)),
            ..Default::default()
        };
        assert_eq!(field_of(reject_derived_fields(&guard).unwrap_err()), "kar");
        assert!(reject_derived_fields(&DerivedFieldGuard::default()).is_ok());
    }
}
