use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a001_work_order::aggregate::{Part, WorkOrder, WorkOrderStatus};
use crate::domain::a002_accessory_sale::aggregate::AccessorySaleStatus;
use crate::domain::a003_expense::aggregate::Expense;
use crate::domain::common::Financials;

/// Request for the daily summary (inclusive range of local calendar days)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummaryRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Request for the single-day receipt profit report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptProfitRequest {
    pub date: NaiveDate,
}

/// Records of one local calendar day.
///
/// `order_count` counts every record of the day, cancelled ones included;
/// money columns exclude cancelled records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub order_count: i64,
    pub cancelled_count: i64,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_margin: Decimal,
}

impl DailyBucket {
    pub fn empty(date: NaiveDate) -> Self {
        let zero = Financials::zero();
        Self {
            date,
            order_count: 0,
            cancelled_count: 0,
            total_revenue: zero.total_sale,
            total_cost: zero.total_cost,
            total_margin: zero.margin,
        }
    }
}

/// Range-wide totals, the sum of the buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub order_count: i64,
    pub cancelled_count: i64,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_margin: Decimal,
    /// total_margin / total_revenue × 100, 0 without revenue
    pub margin_percent: Decimal,
}

/// One work order inside a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportWorkOrderRow {
    pub id: i64,
    pub fis_no: i64,
    pub customer_name: String,
    pub vehicle: String,
    pub status: WorkOrderStatus,
    pub created_at: DateTime<Utc>,
    /// Local calendar day the order belongs to
    pub local_date: NaiveDate,
    pub created_by: Option<String>,
    pub created_by_username: Option<String>,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub margin: Decimal,
    pub margin_percent: Decimal,
}

/// One accessory sale inside a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAccessorySaleRow {
    pub id: i64,
    pub customer_name: String,
    pub product: Option<String>,
    pub status: AccessorySaleStatus,
    pub created_at: DateTime<Utc>,
    pub local_date: NaiveDate,
    pub created_by: Option<String>,
    pub created_by_username: Option<String>,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub margin: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummaryResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Work-order buckets, ascending by date, only days with records
    pub days: Vec<DailyBucket>,
    /// Work orders of the range, newest first
    pub work_orders: Vec<ReportWorkOrderRow>,
    pub expenses: Vec<Expense>,
    pub totals: ReportTotals,
    /// Accessory sales are bucketed separately from work orders
    pub accessory_days: Vec<DailyBucket>,
    pub accessory_sales: Vec<ReportAccessorySaleRow>,
    pub accessory_totals: ReportTotals,
    pub expense_total: Decimal,
    /// work-order margin + accessory margin − expenses
    pub net_profit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptProfitResponse {
    pub date: NaiveDate,
    pub work_orders: Vec<ReportWorkOrderRow>,
    pub totals: ReportTotals,
}

/// Process-wide totals (not date scoped)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralStats {
    /// Every work order, cancelled included
    pub work_order_count: i64,
    /// Neither completed nor cancelled
    pub open_work_order_count: i64,
    pub cancelled_work_order_count: i64,
    pub customer_count: i64,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_margin: Decimal,
    pub accessory_sale_count: i64,
    pub accessory_revenue: Decimal,
    pub accessory_margin: Decimal,
    pub expense_total: Decimal,
    pub net_profit: Decimal,
}

/// Part with its computed line totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartLine {
    #[serde(flatten)]
    pub part: Part,
    pub line_cost: Decimal,
    pub line_sale: Decimal,
    pub line_margin: Decimal,
}

/// Drill-down view of a single work order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderDetail {
    pub work_order: WorkOrder,
    pub lines: Vec<PartLine>,
    pub margin_percent: Decimal,
    pub created_by_username: Option<String>,
}
