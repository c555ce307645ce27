use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, EntityMetadata};

crate::integer_aggregate_id!(CustomerId);

/// Address-book entry (müşteri, aggregate a004).
///
/// Financial records copy customer data by value and never reference this table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(rename = "ad_soyad")]
    pub full_name: String,
    #[serde(rename = "telefon")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "adres")]
    pub address: Option<String>,
    #[serde(rename = "notlar")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl AggregateRoot for Customer {
    type Id = CustomerId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn code(&self) -> String {
        format!("MST-{:06}", self.id.value())
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a004"
    }

    fn collection_name() -> &'static str {
        "customer"
    }

    fn element_name() -> &'static str {
        "Müşteri"
    }

    fn list_name() -> &'static str {
        "Müşteriler"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCustomerDto {
    #[serde(rename = "ad_soyad", default)]
    pub full_name: String,
    #[serde(rename = "telefon", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "adres", default)]
    pub address: Option<String>,
    #[serde(rename = "notlar", default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomerDto {
    #[serde(rename = "ad_soyad", default)]
    pub full_name: Option<String>,
    #[serde(rename = "telefon", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "adres", default)]
    pub address: Option<String>,
    #[serde(rename = "notlar", default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerListFilter {
    /// Substring of name or phone
    pub search: Option<String>,
}
