use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::common::{
    check_completion, check_transition, derive_financials, money, AggregateRoot, DerivedFieldGuard,
    DocumentStatus, EntityMetadata, Financials, LineItem, NewLineItemDto, TransitionError,
};

crate::integer_aggregate_id!(AccessorySaleId);

/// Accessory sale status; there is no awaiting-payment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessorySaleStatus {
    #[serde(rename = "beklemede")]
    Pending,
    #[serde(rename = "islemde")]
    InProgress,
    #[serde(rename = "tamamlandi")]
    Completed,
    #[serde(rename = "iptal_edildi")]
    Cancelled,
}

impl AccessorySaleStatus {
    pub const ALL: [AccessorySaleStatus; 4] = [
        AccessorySaleStatus::Pending,
        AccessorySaleStatus::InProgress,
        AccessorySaleStatus::Completed,
        AccessorySaleStatus::Cancelled,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl DocumentStatus for AccessorySaleStatus {
    fn initial() -> Self {
        AccessorySaleStatus::Pending
    }

    fn completed() -> Self {
        AccessorySaleStatus::Completed
    }

    fn cancelled() -> Self {
        AccessorySaleStatus::Cancelled
    }

    fn as_str(&self) -> &'static str {
        match self {
            AccessorySaleStatus::Pending => "beklemede",
            AccessorySaleStatus::InProgress => "islemde",
            AccessorySaleStatus::Completed => "tamamlandi",
            AccessorySaleStatus::Cancelled => "iptal_edildi",
        }
    }
}

/// Payment method (ödeme yöntemi)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "nakit")]
    Cash,
    #[serde(rename = "kredi_karti")]
    CreditCard,
    #[serde(rename = "havale")]
    BankTransfer,
    #[serde(rename = "diger")]
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "nakit",
            PaymentMethod::CreditCard => "kredi_karti",
            PaymentMethod::BankTransfer => "havale",
            PaymentMethod::Other => "diger",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            PaymentMethod::Cash,
            PaymentMethod::CreditCard,
            PaymentMethod::BankTransfer,
            PaymentMethod::Other,
        ]
        .into_iter()
        .find(|method| method.as_str() == s)
    }
}

/// Sold accessory line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessoryPart {
    pub id: i64,
    #[serde(rename = "ad")]
    pub name: String,
    #[serde(rename = "adet")]
    pub quantity: i32,
    #[serde(rename = "birim_maliyet")]
    pub unit_cost: Decimal,
    #[serde(rename = "birim_satis_fiyati")]
    pub unit_sale_price: Decimal,
}

impl LineItem for AccessoryPart {
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

/// Accessory-only sale (aksesuar satışı, aggregate a002)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessorySale {
    pub id: AccessorySaleId,

    #[serde(rename = "musteri_adi")]
    pub customer_name: String,
    #[serde(rename = "telefon")]
    pub phone: Option<String>,
    /// Product or free-text description of the sale
    #[serde(rename = "urun")]
    pub product: Option<String>,
    #[serde(rename = "odeme_yontemi")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "odeme_detaylari")]
    pub payment_details: Option<String>,

    #[serde(rename = "toplam_maliyet")]
    pub total_cost: Decimal,
    #[serde(rename = "toplam_satis")]
    pub total_sale: Decimal,
    #[serde(rename = "kar")]
    pub margin: Decimal,

    #[serde(rename = "durum")]
    pub status: AccessorySaleStatus,
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(rename = "parcalar")]
    pub parts: Vec<AccessoryPart>,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl AccessorySale {
    pub fn blank(customer_name: String, created_by: Option<String>) -> Self {
        Self {
            id: AccessorySaleId(0),
            customer_name,
            phone: None,
            product: None,
            payment_method: PaymentMethod::default(),
            payment_details: None,
            total_cost: money::zero(),
            total_sale: money::zero(),
            margin: money::zero(),
            status: AccessorySaleStatus::initial(),
            completed_at: None,
            parts: Vec::new(),
            metadata: EntityMetadata::new(created_by),
        }
    }

    pub fn financials(&self) -> Financials {
        Financials {
            total_cost: self.total_cost,
            total_sale: self.total_sale,
            margin: self.margin,
        }
    }

    /// Re-derive cost, sale and margin from the lines
    pub fn recompute(&mut self) {
        let financials = derive_financials(&self.parts);
        self.total_cost = financials.total_cost;
        self.total_sale = financials.total_sale;
        self.margin = financials.margin;
    }

    pub fn change_status(&mut self, status: AccessorySaleStatus) -> Result<(), TransitionError> {
        check_transition(self.status, status)?;
        self.status = status;
        Ok(())
    }

    /// Mark as completed. Returns `false` when it already was.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<bool, TransitionError> {
        if !check_completion(self.status)? {
            return Ok(false);
        }
        self.status = AccessorySaleStatus::Completed;
        self.completed_at = Some(now);
        Ok(true)
    }
}

impl AggregateRoot for AccessorySale {
    type Id = AccessorySaleId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn code(&self) -> String {
        format!("AKS-{:06}", self.id.value())
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "accessory_sale"
    }

    fn element_name() -> &'static str {
        "Aksesuar Satışı"
    }

    fn list_name() -> &'static str {
        "Aksesuar Satışları"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAccessorySaleDto {
    #[serde(rename = "musteri_adi", default)]
    pub customer_name: String,
    #[serde(rename = "telefon", default)]
    pub phone: Option<String>,
    #[serde(rename = "urun", default)]
    pub product: Option<String>,
    #[serde(rename = "odeme_yontemi", default)]
    pub payment_method: PaymentMethod,
    #[serde(rename = "odeme_detaylari", default)]
    pub payment_details: Option<String>,
    #[serde(rename = "parcalar", default)]
    pub parts: Vec<NewLineItemDto>,
    #[serde(flatten)]
    pub derived: DerivedFieldGuard,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccessorySaleDto {
    #[serde(rename = "musteri_adi", default)]
    pub customer_name: Option<String>,
    #[serde(rename = "telefon", default)]
    pub phone: Option<String>,
    #[serde(rename = "urun", default)]
    pub product: Option<String>,
    #[serde(rename = "odeme_yontemi", default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(rename = "odeme_detaylari", default)]
    pub payment_details: Option<String>,
    #[serde(rename = "durum", default)]
    pub status: Option<AccessorySaleStatus>,
    #[serde(rename = "parcalar", default)]
    pub parts: Option<Vec<NewLineItemDto>>,
    #[serde(flatten)]
    pub derived: DerivedFieldGuard,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessorySaleListFilter {
    pub status: Option<AccessorySaleStatus>,
    pub date: Option<NaiveDate>,
}
