use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_quantity() -> i32 {
    1
}

/// Line item as sent by the client for work orders and accessory sales
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLineItemDto {
    /// Optional part code; ignored by accessory sales
    #[serde(rename = "parca_kodu", default)]
    pub code: Option<String>,
    #[serde(rename = "ad", default)]
    pub name: String,
    #[serde(rename = "adet", default = "default_quantity")]
    pub quantity: i32,
    #[serde(rename = "birim_maliyet", default)]
    pub unit_cost: Decimal,
    #[serde(rename = "birim_satis_fiyati", default)]
    pub unit_sale_price: Decimal,
}

impl NewLineItemDto {
    pub fn new(name: &str, quantity: i32, unit_cost: Decimal, unit_sale_price: Decimal) -> Self {
        Self {
            code: None,
            name: name.to_string(),
            quantity,
            unit_cost,
            unit_sale_price,
        }
    }
}

/// Totals computed by the server. Clients must not send them; their presence is
/// captured here so the service can reject the payload naming the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivedFieldGuard {
    #[serde(rename = "kar", default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<serde_json::Value>,
    #[serde(rename = "toplam_maliyet", default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<serde_json::Value>,
    #[serde(rename = "gercek_toplam_ucret", default, skip_serializing_if = "Option::is_none")]
    pub actual_fee: Option<serde_json::Value>,
    #[serde(rename = "toplam_satis", default, skip_serializing_if = "Option::is_none")]
    pub total_sale: Option<serde_json::Value>,
}

impl DerivedFieldGuard {
    /// Wire name of the first derived field present in the payload
    pub fn first_present(&self) -> Option<&'static str> {
        [
            ("kar", &self.margin),
            ("toplam_maliyet", &self.total_cost),
            ("gercek_toplam_ucret", &self.actual_fee),
            ("toplam_satis", &self.total_sale),
        ]
        .into_iter()
        .find(|(_, value)| value.is_some())
        .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quantity_defaults_to_one() {
        let dto: NewLineItemDto =
            serde_json::from_str(r#"{"ad":"İşçilik","birim_satis_fiyati":150}"#).unwrap();
        assert_eq!(dto.quantity, 1);
        assert_eq!(dto.unit_cost, Decimal::ZERO);
        assert_eq!(dto.unit_sale_price, dec!(150));
    }

    #[test]
    fn guard_reports_first_derived_field() {
        let guard: DerivedFieldGuard =
            serde_json::from_str(r#"{"toplam_maliyet":1,"toplam_satis":2}"#).unwrap();
        assert_eq!(guard.first_present(), Some("toplam_maliyet"));
        assert_eq!(DerivedFieldGuard::default().first_present(), None);
    }
}
