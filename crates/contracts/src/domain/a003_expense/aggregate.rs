use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, EntityMetadata};

crate::integer_aggregate_id!(ExpenseId);

/// Default category when the client does not send one
pub const DEFAULT_CATEGORY: &str = "genel";

/// Shop expense (gider, aggregate a003). Deducted as-is in profit reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    #[serde(rename = "aciklama")]
    pub description: String,
    #[serde(rename = "tutar")]
    pub amount: Decimal,
    #[serde(rename = "kategori")]
    pub category: String,
    /// Calendar date the expense belongs to
    #[serde(rename = "tarih")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl AggregateRoot for Expense {
    type Id = ExpenseId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn code(&self) -> String {
        format!("GDR-{:06}", self.id.value())
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "expense"
    }

    fn element_name() -> &'static str {
        "Gider"
    }

    fn list_name() -> &'static str {
        "Giderler"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpenseDto {
    #[serde(rename = "aciklama", default)]
    pub description: String,
    #[serde(rename = "tutar")]
    pub amount: Decimal,
    #[serde(rename = "kategori", default)]
    pub category: Option<String>,
    /// Defaults to the current local day
    #[serde(rename = "tarih", default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExpenseDto {
    #[serde(rename = "aciklama", default)]
    pub description: Option<String>,
    #[serde(rename = "tutar", default)]
    pub amount: Option<Decimal>,
    #[serde(rename = "kategori", default)]
    pub category: Option<String>,
    #[serde(rename = "tarih", default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseListFilter {
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
}
