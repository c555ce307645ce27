use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::common::{
    check_completion, check_transition, derive_financials, money, AggregateRoot, DerivedFieldGuard,
    DocumentStatus, EntityMetadata, Financials, LineItem, NewLineItemDto, TransitionError,
};

crate::integer_aggregate_id!(WorkOrderId);

/// Work order status (durum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkOrderStatus {
    #[serde(rename = "beklemede")]
    Pending,
    #[serde(rename = "islemde")]
    InProgress,
    #[serde(rename = "odeme_bekleniyor")]
    AwaitingPayment,
    #[serde(rename = "tamamlandi")]
    Completed,
    #[serde(rename = "iptal_edildi")]
    Cancelled,
}

impl WorkOrderStatus {
    pub const ALL: [WorkOrderStatus; 5] = [
        WorkOrderStatus::Pending,
        WorkOrderStatus::InProgress,
        WorkOrderStatus::AwaitingPayment,
        WorkOrderStatus::Completed,
        WorkOrderStatus::Cancelled,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl DocumentStatus for WorkOrderStatus {
    fn initial() -> Self {
        WorkOrderStatus::Pending
    }

    fn completed() -> Self {
        WorkOrderStatus::Completed
    }

    fn cancelled() -> Self {
        WorkOrderStatus::Cancelled
    }

    fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Pending => "beklemede",
            WorkOrderStatus::InProgress => "islemde",
            WorkOrderStatus::AwaitingPayment => "odeme_bekleniyor",
            WorkOrderStatus::Completed => "tamamlandi",
            WorkOrderStatus::Cancelled => "iptal_edildi",
        }
    }
}

/// Part or labour line of a work order (parça)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: i64,
    #[serde(rename = "parca_kodu")]
    pub code: Option<String>,
    #[serde(rename = "ad")]
    pub name: String,
    #[serde(rename = "adet")]
    pub quantity: i32,
    #[serde(rename = "birim_maliyet")]
    pub unit_cost: Decimal,
    #[serde(rename = "birim_satis_fiyati")]
    pub unit_sale_price: Decimal,
}

impl LineItem for Part {
    fn quantity(&self) -> i32 {
        self.quantity
    }
    fn unit_cost(&self) -> Decimal {
        self.unit_cost
    }
    fn unit_sale_price(&self) -> Decimal {
        self.unit_sale_price
    }
}

/// Job ticket of the repair shop (iş emri, aggregate a001)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: WorkOrderId,

    /// Sequential receipt number, never reused
    pub fis_no: i64,

    #[serde(rename = "musteri_adi")]
    pub customer_name: String,
    #[serde(rename = "telefon")]
    pub phone: Option<String>,
    #[serde(rename = "musteri_notu")]
    pub customer_note: Option<String>,

    #[serde(rename = "marka")]
    pub vehicle_brand: Option<String>,
    #[serde(rename = "model")]
    pub vehicle_model: Option<String>,
    #[serde(rename = "km")]
    pub odometer_km: Option<i64>,

    /// Customer complaint
    #[serde(rename = "aciklama")]
    pub description: Option<String>,
    #[serde(rename = "yapilan_islemler")]
    pub work_performed: Option<String>,
    #[serde(rename = "teslim_notu")]
    pub delivery_note: Option<String>,

    /// Advisory estimate given at intake
    #[serde(rename = "tahmini_toplam_ucret")]
    pub estimated_fee: Decimal,
    /// Always equal to the sum of line sale totals
    #[serde(rename = "gercek_toplam_ucret")]
    pub actual_fee: Decimal,
    #[serde(rename = "toplam_maliyet")]
    pub total_cost: Decimal,
    #[serde(rename = "kar")]
    pub margin: Decimal,

    #[serde(rename = "durum")]
    pub status: WorkOrderStatus,
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(rename = "parcalar")]
    pub parts: Vec<Part>,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl WorkOrder {
    /// Zero-valued order used while building a new aggregate before it is stored
    pub fn blank(customer_name: String, created_by: Option<String>) -> Self {
        Self {
            id: WorkOrderId(0),
            fis_no: 0,
            customer_name,
            phone: None,
            customer_note: None,
            vehicle_brand: None,
            vehicle_model: None,
            odometer_km: None,
            description: None,
            work_performed: None,
            delivery_note: None,
            estimated_fee: money::zero(),
            actual_fee: money::zero(),
            total_cost: money::zero(),
            margin: money::zero(),
            status: WorkOrderStatus::initial(),
            completed_at: None,
            parts: Vec::new(),
            metadata: EntityMetadata::new(created_by),
        }
    }

    /// Current totals as stored on the aggregate
    pub fn financials(&self) -> Financials {
        Financials {
            total_cost: self.total_cost,
            total_sale: self.actual_fee,
            margin: self.margin,
        }
    }

    /// Re-derive cost, actual fee and margin from the parts
    pub fn recompute(&mut self) {
        let financials = derive_financials(&self.parts);
        self.total_cost = financials.total_cost;
        self.actual_fee = financials.total_sale;
        self.margin = financials.margin;
    }

    pub fn margin_percent(&self) -> Decimal {
        self.financials().margin_percent()
    }

    /// Apply a status requested by a generic update
    pub fn change_status(&mut self, status: WorkOrderStatus) -> Result<(), TransitionError> {
        check_transition(self.status, status)?;
        self.status = status;
        Ok(())
    }

    /// Mark as completed. Returns `false` when it already was, keeping the first timestamp.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<bool, TransitionError> {
        if !check_completion(self.status)? {
            return Ok(false);
        }
        self.status = WorkOrderStatus::Completed;
        self.completed_at = Some(now);
        Ok(true)
    }
}

impl AggregateRoot for WorkOrder {
    type Id = WorkOrderId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn code(&self) -> String {
        format!("FIS-{:06}", self.fis_no)
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "work_order"
    }

    fn element_name() -> &'static str {
        "İş Emri"
    }

    fn list_name() -> &'static str {
        "İş Emirleri"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateWorkOrderDto {
    #[serde(rename = "musteri_adi", default)]
    pub customer_name: String,
    #[serde(rename = "telefon", default)]
    pub phone: Option<String>,
    #[serde(rename = "musteri_notu", default)]
    pub customer_note: Option<String>,
    #[serde(rename = "marka", default)]
    pub vehicle_brand: Option<String>,
    #[serde(rename = "model", default)]
    pub vehicle_model: Option<String>,
    #[serde(rename = "km", default)]
    pub odometer_km: Option<i64>,
    #[serde(rename = "aciklama", default)]
    pub description: Option<String>,
    #[serde(rename = "yapilan_islemler", default)]
    pub work_performed: Option<String>,
    #[serde(rename = "teslim_notu", default)]
    pub delivery_note: Option<String>,
    #[serde(rename = "tahmini_toplam_ucret", default)]
    pub estimated_fee: Option<Decimal>,
    #[serde(rename = "parcalar", default)]
    pub parts: Vec<NewLineItemDto>,
    #[serde(flatten)]
    pub derived: DerivedFieldGuard,
}

/// Partial update; absent fields are left untouched, empty strings clear text fields
/// and `km: null` clears the odometer reading
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkOrderDto {
    #[serde(rename = "musteri_adi", default)]
    pub customer_name: Option<String>,
    #[serde(rename = "telefon", default)]
    pub phone: Option<String>,
    #[serde(rename = "musteri_notu", default)]
    pub customer_note: Option<String>,
    #[serde(rename = "marka", default)]
    pub vehicle_brand: Option<String>,
    #[serde(rename = "model", default)]
    pub vehicle_model: Option<String>,
    /// `null` clears the reading
    #[serde(
        rename = "km",
        default,
        deserialize_with = "crate::domain::common::nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub odometer_km: Option<Option<i64>>,
    #[serde(rename = "aciklama", default)]
    pub description: Option<String>,
    #[serde(rename = "yapilan_islemler", default)]
    pub work_performed: Option<String>,
    #[serde(rename = "teslim_notu", default)]
    pub delivery_note: Option<String>,
    #[serde(rename = "tahmini_toplam_ucret", default)]
    pub estimated_fee: Option<Decimal>,
    #[serde(rename = "durum", default)]
    pub status: Option<WorkOrderStatus>,
    /// Full replacement of the line items
    #[serde(rename = "parcalar", default)]
    pub parts: Option<Vec<NewLineItemDto>>,
    #[serde(flatten)]
    pub derived: DerivedFieldGuard,
}

/// Query parameters of the work order list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkOrderListFilter {
    pub status: Option<WorkOrderStatus>,
    /// Local calendar day of creation
    pub date: Option<NaiveDate>,
}

/// Response of the receipt number preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextReceiptNumber {
    pub fis_no: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn part(id: i64, qty: i32, cost: Decimal, sale: Decimal) -> Part {
        Part {
            id,
            code: None,
            name: format!("line {}", id),
            quantity: qty,
            unit_cost: cost,
            unit_sale_price: sale,
        }
    }

    #[test]
    fn recompute_keeps_margin_identity() {
        let mut order = WorkOrder::blank("Ali Veli".into(), None);
        order.estimated_fee = dec!(500);
        order.parts.push(part(1, 2, dec!(10), dec!(25)));
        order.recompute();
        assert_eq!(order.total_cost, dec!(20));
        assert_eq!(order.actual_fee, dec!(50));
        assert_eq!(order.margin, dec!(30));

        order.parts.push(part(2, 1, dec!(100), dec!(80)));
        order.recompute();
        assert_eq!(order.total_cost, dec!(120));
        assert_eq!(order.actual_fee, dec!(130));
        assert_eq!(order.margin, dec!(10));

        order.parts.retain(|p| p.id != 2);
        order.recompute();
        assert_eq!(order.financials(), Financials::from_totals(dec!(20), dec!(50)));
        assert_eq!(order.estimated_fee, dec!(500));
    }

    #[test]
    fn complete_stamps_only_once() {
        let mut order = WorkOrder::blank("Ayşe".into(), None);
        let first = Utc::now();
        assert_eq!(order.complete(first), Ok(true));
        let later = first + chrono::Duration::minutes(5);
        assert_eq!(order.complete(later), Ok(false));
        assert_eq!(order.completed_at, Some(first));
        assert_eq!(order.status, WorkOrderStatus::Completed);
    }

    #[test]
    fn cancelled_order_cannot_complete() {
        let mut order = WorkOrder::blank("Mehmet".into(), None);
        order.change_status(WorkOrderStatus::Cancelled).unwrap();
        assert_eq!(
            order.complete(Utc::now()),
            Err(TransitionError::CancelledCannotComplete)
        );
        assert!(order.completed_at.is_none());
    }

    #[test]
    fn status_wire_names() {
        let json = serde_json::to_string(&WorkOrderStatus::AwaitingPayment).unwrap();
        assert_eq!(json, "\"odeme_bekleniyor\"");
        assert_eq!(WorkOrderStatus::parse("iptal_edildi"), Some(WorkOrderStatus::Cancelled));
        assert_eq!(WorkOrderStatus::parse("done"), None);
    }

    #[test]
    fn update_payload_detects_derived_fields() {
        let dto: UpdateWorkOrderDto =
            serde_json::from_str(r#"{"aciklama":"fren","kar":"99.00"}"#).unwrap();
        assert_eq!(dto.derived.first_present(), Some("kar"));
        assert_eq!(dto.description.as_deref(), Some("fren"));

        let dto: UpdateWorkOrderDto = serde_json::from_str(r#"{"durum":"islemde"}"#).unwrap();
        assert_eq!(dto.derived.first_present(), None);
        assert_eq!(dto.status, Some(WorkOrderStatus::InProgress));
    }

    #[test]
    fn serializes_turkish_field_names() {
        let order = WorkOrder::blank("Zeynep".into(), Some("u-1".into()));
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["musteri_adi"], "Zeynep");
        assert_eq!(value["durum"], "beklemede");
        assert_eq!(value["kar"], "0.00");
        assert_eq!(value["created_by"], "u-1");
        assert!(value["parcalar"].as_array().unwrap().is_empty());
    }
}
