//! Financial reports over work orders, accessory sales and expenses.
//!
//! Records are fetched by UTC instant range and grouped in Rust by their local
//! calendar day in the display offset. Cancelled records are counted but add
//! nothing to revenue, cost or margin.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use contracts::dashboards::d400_financial_reports::{
    DailyBucket, DailySummaryResponse, GeneralStats, PartLine, ReceiptProfitResponse,
    ReportAccessorySaleRow, ReportTotals, ReportWorkOrderRow, WorkOrderDetail,
};
use contracts::domain::a001_work_order::aggregate::{WorkOrderId, WorkOrderStatus};
use contracts::domain::a002_accessory_sale::aggregate::AccessorySaleStatus;
use contracts::domain::common::{margin_percent, money, DocumentStatus, Financials, LineItem};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbErr};

use super::repository::{self, AccessorySaleRecord, StatusTotals, WorkOrderRecord};
use crate::domain::{a001_work_order, a003_expense, a004_customer};
use crate::shared::error::{ServiceError, ServiceResult};
use crate::shared::time;

/// One record as seen by the day bucketing
#[derive(Debug, Clone, Copy)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub cancelled: bool,
    pub financials: Financials,
}

/// Group entries by local day, ascending; only days with entries appear
pub fn bucket_by_day<I>(entries: I) -> Vec<DailyBucket>
where
    I: IntoIterator<Item = DayEntry>,
{
    let mut days: BTreeMap<NaiveDate, DailyBucket> = BTreeMap::new();
    for entry in entries {
        let bucket = days
            .entry(entry.date)
            .or_insert_with(|| DailyBucket::empty(entry.date));
        bucket.order_count += 1;
        if entry.cancelled {
            bucket.cancelled_count += 1;
            continue;
        }
        bucket.total_revenue += entry.financials.total_sale;
        bucket.total_cost += entry.financials.total_cost;
        bucket.total_margin += entry.financials.margin;
    }
    days.into_values().collect()
}

/// Range totals as the plain sum of the buckets
pub fn sum_buckets(buckets: &[DailyBucket]) -> ReportTotals {
    let mut sums = Financials::zero();
    let mut order_count = 0;
    let mut cancelled_count = 0;
    for bucket in buckets {
        order_count += bucket.order_count;
        cancelled_count += bucket.cancelled_count;
        sums += Financials {
            total_cost: bucket.total_cost,
            total_sale: bucket.total_revenue,
            margin: bucket.total_margin,
        };
    }
    ReportTotals {
        order_count,
        cancelled_count,
        total_revenue: sums.total_sale,
        total_cost: sums.total_cost,
        total_margin: sums.margin,
        margin_percent: margin_percent(sums.margin, sums.total_sale),
    }
}

fn vehicle_label(brand: Option<&str>, model: Option<&str>) -> String {
    [brand, model]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn work_order_row(record: WorkOrderRecord, offset: FixedOffset) -> Result<ReportWorkOrderRow, DbErr> {
    let status = WorkOrderStatus::parse(&record.status)
        .ok_or_else(|| DbErr::Type(format!("unknown work order status '{}'", record.status)))?;
    let created_at = time::from_db(&record.created_at)?;
    let revenue = money::from_minor_units(record.actual_fee_minor);
    let margin = money::from_minor_units(record.margin_minor);

    Ok(ReportWorkOrderRow {
        id: record.id,
        fis_no: record.fis_no,
        vehicle: vehicle_label(record.vehicle_brand.as_deref(), record.vehicle_model.as_deref()),
        customer_name: record.customer_name,
        status,
        created_at,
        local_date: time::local_date(created_at, offset),
        created_by: record.created_by,
        created_by_username: record.created_by_username,
        revenue,
        cost: money::from_minor_units(record.total_cost_minor),
        margin,
        margin_percent: margin_percent(margin, revenue),
    })
}

fn accessory_sale_row(
    record: AccessorySaleRecord,
    offset: FixedOffset,
) -> Result<ReportAccessorySaleRow, DbErr> {
    let status = AccessorySaleStatus::parse(&record.status)
        .ok_or_else(|| DbErr::Type(format!("unknown accessory sale status '{}'", record.status)))?;
    let created_at = time::from_db(&record.created_at)?;

    Ok(ReportAccessorySaleRow {
        id: record.id,
        customer_name: record.customer_name,
        product: record.product,
        status,
        created_at,
        local_date: time::local_date(created_at, offset),
        created_by: record.created_by,
        created_by_username: record.created_by_username,
        revenue: money::from_minor_units(record.total_sale_minor),
        cost: money::from_minor_units(record.total_cost_minor),
        margin: money::from_minor_units(record.margin_minor),
    })
}

fn work_order_entry(row: &ReportWorkOrderRow) -> DayEntry {
    DayEntry {
        date: row.local_date,
        cancelled: row.status.is_cancelled(),
        financials: Financials {
            total_cost: row.cost,
            total_sale: row.revenue,
            margin: row.margin,
        },
    }
}

fn accessory_entry(row: &ReportAccessorySaleRow) -> DayEntry {
    DayEntry {
        date: row.local_date,
        cancelled: row.status.is_cancelled(),
        financials: Financials {
            total_cost: row.cost,
            total_sale: row.revenue,
            margin: row.margin,
        },
    }
}

async fn work_order_rows(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
    offset: FixedOffset,
) -> ServiceResult<Vec<ReportWorkOrderRow>> {
    let (from, to) = time::local_days_utc(start, end, offset);
    let rows = repository::work_orders_created_between(db, from, to)
        .await?
        .into_iter()
        .map(|record| work_order_row(record, offset))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Per-day figures for the inclusive local-day range `start..=end`
pub async fn daily_summary(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> ServiceResult<DailySummaryResponse> {
    if start > end {
        return Err(ServiceError::validation("start", "must not be after end"));
    }
    let offset = time::display_offset();

    let work_orders = work_order_rows(db, start, end, offset).await?;
    let days = bucket_by_day(work_orders.iter().map(work_order_entry));
    let totals = sum_buckets(&days);

    let (from, to) = time::local_days_utc(start, end, offset);
    let accessory_sales = repository::accessory_sales_created_between(db, from, to)
        .await?
        .into_iter()
        .map(|record| accessory_sale_row(record, offset))
        .collect::<Result<Vec<_>, _>>()?;
    let accessory_days = bucket_by_day(accessory_sales.iter().map(accessory_entry));
    let accessory_totals = sum_buckets(&accessory_days);

    let expenses = a003_expense::repository::list(db, Some((start, end)), None).await?;
    let expense_total = expenses
        .iter()
        .fold(money::zero(), |sum, expense| sum + expense.amount);
    let net_profit = totals.total_margin + accessory_totals.total_margin - expense_total;

    tracing::debug!(
        "Daily summary {}..{}: {} work orders, {} accessory sales, {} expenses",
        start,
        end,
        work_orders.len(),
        accessory_sales.len(),
        expenses.len()
    );

    Ok(DailySummaryResponse {
        start,
        end,
        days,
        work_orders,
        expenses,
        totals,
        accessory_days,
        accessory_sales,
        accessory_totals,
        expense_total,
        net_profit,
    })
}

/// Every work order of one local day with its profit figures
pub async fn receipt_profit_report(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> ServiceResult<ReceiptProfitResponse> {
    let work_orders = work_order_rows(db, date, date, time::display_offset()).await?;
    let totals = sum_buckets(&bucket_by_day(work_orders.iter().map(work_order_entry)));
    Ok(ReceiptProfitResponse {
        date,
        work_orders,
        totals,
    })
}

fn minor_total(totals: &StatusTotals) -> Financials {
    Financials {
        total_cost: money::from_minor_units(totals.cost_minor),
        total_sale: money::from_minor_units(totals.revenue_minor),
        margin: money::from_minor_units(totals.margin_minor),
    }
}

pub async fn general_stats(db: &DatabaseConnection) -> ServiceResult<GeneralStats> {
    let orders = repository::work_order_totals(db).await?;
    let sales = repository::accessory_sale_totals(db).await?;
    let expense_total = money::from_minor_units(repository::expense_total_minor(db).await?);
    let customer_count = a004_customer::repository::count(db).await?;

    let order_money = minor_total(&orders);
    let sale_money = minor_total(&sales);

    Ok(GeneralStats {
        work_order_count: orders.cnt,
        open_work_order_count: orders.open_cnt,
        cancelled_work_order_count: orders.cancelled_cnt,
        customer_count: i64::try_from(customer_count).unwrap_or(i64::MAX),
        total_revenue: order_money.total_sale,
        total_cost: order_money.total_cost,
        total_margin: order_money.margin,
        accessory_sale_count: sales.cnt,
        accessory_revenue: sale_money.total_sale,
        accessory_margin: sale_money.margin,
        expense_total,
        net_profit: order_money.margin + sale_money.margin - expense_total,
    })
}

/// Work order with per-line totals and the creator's username
pub async fn work_order_detail(
    db: &DatabaseConnection,
    id: WorkOrderId,
) -> ServiceResult<WorkOrderDetail> {
    let order = a001_work_order::repository::find(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("a001_work_order", id))?;

    let created_by_username = match order.metadata.created_by.as_deref() {
        Some(user_id) => repository::username_of(db, user_id).await?,
        None => None,
    };
    let lines = order
        .parts
        .iter()
        .map(|part| {
            let line_cost = money::normalize(part.line_cost());
            let line_sale = money::normalize(part.line_sale());
            PartLine {
                part: part.clone(),
                line_cost,
                line_sale,
                line_margin: line_sale - line_cost,
            }
        })
        .collect();

    Ok(WorkOrderDetail {
        margin_percent: order.margin_percent(),
        work_order: order,
        lines,
        created_by_username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_work_order::service as work_orders;
    use crate::domain::a001_work_order::service::tests::{order_dto, set_created_at};
    use crate::domain::a002_accessory_sale::service as accessory_sales;
    use crate::domain::a002_accessory_sale::service::tests::sale_dto;
    use crate::domain::a003_expense::service as expenses;
    use crate::shared::activity_log::Actor;
    use crate::shared::data::db::test_connection;
    use chrono::{TimeZone, Utc};
    use contracts::domain::a001_work_order::aggregate::UpdateWorkOrderDto;
    use contracts::domain::a003_expense::aggregate::CreateExpenseDto;
    use contracts::domain::common::NewLineItemDto;
    use rust_decimal_macros::dec;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(date: NaiveDate, cancelled: bool, cost: Decimal, sale: Decimal) -> DayEntry {
        DayEntry {
            date,
            cancelled,
            financials: Financials::from_totals(cost, sale),
        }
    }

    fn actor() -> Actor {
        Actor::new("u-admin", "admin", None)
    }

    #[test]
    fn boundary_seconds_fall_in_different_buckets() {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let late = offset.with_ymd_and_hms(2024, 5, 10, 23, 59, 59).unwrap().with_timezone(&Utc);
        let early = offset.with_ymd_and_hms(2024, 5, 11, 0, 0, 1).unwrap().with_timezone(&Utc);

        let buckets = bucket_by_day([
            entry(time::local_date(early, offset), false, dec!(1), dec!(2)),
            entry(time::local_date(late, offset), false, dec!(10), dec!(20)),
        ]);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].date, day(2024, 5, 10));
        assert_eq!(buckets[0].total_revenue, dec!(20));
        assert_eq!(buckets[1].date, day(2024, 5, 11));
        assert_eq!(buckets[1].total_revenue, dec!(2));
    }

    #[test]
    fn cancelled_entries_count_but_add_no_money() {
        let d = day(2024, 1, 1);
        let buckets = bucket_by_day([
            entry(d, false, dec!(20), dec!(50)),
            entry(d, true, dec!(100), dec!(400)),
        ]);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].order_count, 2);
        assert_eq!(buckets[0].cancelled_count, 1);
        assert_eq!(buckets[0].total_revenue, dec!(50));
        assert_eq!(buckets[0].total_margin, dec!(30));

        let totals = sum_buckets(&buckets);
        assert_eq!(totals.order_count, 2);
        assert_eq!(totals.total_cost, dec!(20));
        assert_eq!(totals.margin_percent, dec!(60));
    }

    #[test]
    fn zero_revenue_totals_have_zero_percent() {
        let totals = sum_buckets(&[DailyBucket::empty(day(2024, 1, 1))]);
        assert_eq!(totals.margin_percent, dec!(0));
        assert_eq!(sum_buckets(&[]).order_count, 0);

        let only_cancelled = bucket_by_day([entry(day(2024, 1, 2), true, dec!(5), dec!(9))]);
        assert_eq!(sum_buckets(&only_cancelled).margin_percent, dec!(0));
    }

    #[test]
    fn vehicle_label_skips_missing_parts() {
        assert_eq!(vehicle_label(Some("Fiat"), Some("Doblo")), "Fiat Doblo");
        assert_eq!(vehicle_label(None, Some("Doblo")), "Doblo");
        assert_eq!(vehicle_label(Some(" "), None), "");
    }

    async fn order_at(
        db: &DatabaseConnection,
        name: &str,
        parts: Vec<NewLineItemDto>,
        local: (u32, u32, u32, u32),
    ) -> i64 {
        let order = work_orders::create(db, order_dto(name, parts), &actor())
            .await
            .unwrap();
        let offset = time::display_offset();
        let at = offset
            .with_ymd_and_hms(2024, 5, local.0, local.1, local.2, local.3)
            .unwrap()
            .with_timezone(&Utc);
        set_created_at(db, "a001_work_order", order.id.value(), at).await;
        order.id.value()
    }

    #[tokio::test]
    async fn daily_summary_buckets_by_local_day() {
        let db = test_connection().await;
        let first = order_at(
            &db,
            "Geç",
            vec![NewLineItemDto::new("Filtre", 2, dec!(10), dec!(25))],
            (10, 23, 59, 59),
        )
        .await;
        let second = order_at(
            &db,
            "Erken",
            vec![NewLineItemDto::new("Balata", 1, dec!(100), dec!(180))],
            (11, 0, 0, 1),
        )
        .await;
        let cancelled = order_at(
            &db,
            "İptal",
            vec![NewLineItemDto::new("Motor", 1, dec!(5000), dec!(9000))],
            (11, 12, 0, 0),
        )
        .await;
        work_orders::update(
            &db,
            WorkOrderId(cancelled),
            UpdateWorkOrderDto {
                status: Some(WorkOrderStatus::Cancelled),
                ..Default::default()
            },
            &actor(),
        )
        .await
        .unwrap();
        // outside the range
        order_at(&db, "Sonra", Vec::new(), (12, 0, 0, 0)).await;

        expenses::create(
            &db,
            CreateExpenseDto {
                description: "Kira".into(),
                amount: dec!(40),
                category: None,
                date: Some(day(2024, 5, 11)),
            },
            &actor(),
        )
        .await
        .unwrap();

        let sale = accessory_sales::create(
            &db,
            sale_dto("Can", vec![NewLineItemDto::new("Paspas", 1, dec!(30), dec!(50))]),
            &actor(),
        )
        .await
        .unwrap();
        let sale_at = time::display_offset()
            .with_ymd_and_hms(2024, 5, 10, 9, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        set_created_at(&db, "a002_accessory_sale", sale.id.value(), sale_at).await;

        let report = daily_summary(&db, day(2024, 5, 10), day(2024, 5, 11))
            .await
            .unwrap();

        assert_eq!(report.days.len(), 2);
        assert_eq!(report.days[0].date, day(2024, 5, 10));
        assert_eq!(report.days[0].order_count, 1);
        assert_eq!(report.days[0].total_margin, dec!(30));
        assert_eq!(report.days[1].order_count, 2);
        assert_eq!(report.days[1].cancelled_count, 1);
        assert_eq!(report.days[1].total_revenue, dec!(180));

        assert_eq!(
            report.work_orders.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![cancelled, second, first]
        );
        assert_eq!(report.work_orders[0].revenue, dec!(9000));
        assert_eq!(report.work_orders[0].created_by_username, None);

        assert_eq!(report.totals.order_count, 3);
        assert_eq!(report.totals.total_revenue, dec!(230));
        assert_eq!(report.totals.total_margin, dec!(110));
        let bucket_sum: Decimal = report.days.iter().map(|d| d.total_revenue).sum();
        assert_eq!(bucket_sum, report.totals.total_revenue);

        assert_eq!(report.accessory_days.len(), 1);
        assert_eq!(report.accessory_totals.total_margin, dec!(20));
        assert_eq!(report.expenses.len(), 1);
        assert_eq!(report.expense_total, dec!(40));
        assert_eq!(report.net_profit, dec!(90));
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let db = test_connection().await;
        match daily_summary(&db, day(2024, 5, 2), day(2024, 5, 1)).await {
            Err(ServiceError::ValidationFailed { field, .. }) => assert_eq!(field, "start"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn receipt_profit_lists_one_day() {
        let db = test_connection().await;
        let kept = order_at(
            &db,
            "A",
            vec![NewLineItemDto::new("Yağ", 4, dec!(150), dec!(220))],
            (10, 8, 0, 0),
        )
        .await;
        order_at(&db, "B", Vec::new(), (9, 8, 0, 0)).await;

        let report = receipt_profit_report(&db, day(2024, 5, 10)).await.unwrap();
        assert_eq!(report.work_orders.len(), 1);
        assert_eq!(report.work_orders[0].id, kept);
        assert_eq!(report.work_orders[0].margin_percent, dec!(31.82));
        assert_eq!(report.totals.total_margin, dec!(280));

        let empty = receipt_profit_report(&db, day(2024, 5, 1)).await.unwrap();
        assert!(empty.work_orders.is_empty());
        assert_eq!(empty.totals.margin_percent, dec!(0));
    }

    #[tokio::test]
    async fn general_stats_apply_the_cancellation_policy() {
        let db = test_connection().await;
        let done = work_orders::create(
            &db,
            order_dto("A", vec![NewLineItemDto::new("Filtre", 2, dec!(10), dec!(25))]),
            &actor(),
        )
        .await
        .unwrap();
        work_orders::complete(&db, done.id, &actor()).await.unwrap();
        work_orders::create(&db, order_dto("B", Vec::new()), &actor())
            .await
            .unwrap();
        let dropped = work_orders::create(
            &db,
            order_dto("C", vec![NewLineItemDto::new("Motor", 1, dec!(1000), dec!(1500))]),
            &actor(),
        )
        .await
        .unwrap();
        work_orders::update(
            &db,
            dropped.id,
            UpdateWorkOrderDto {
                status: Some(WorkOrderStatus::Cancelled),
                ..Default::default()
            },
            &actor(),
        )
        .await
        .unwrap();
        accessory_sales::create(
            &db,
            sale_dto("D", vec![NewLineItemDto::new("Kılıf", 1, dec!(10), dec!(15))]),
            &actor(),
        )
        .await
        .unwrap();
        expenses::create(
            &db,
            CreateExpenseDto {
                description: "Su".into(),
                amount: dec!(12.5),
                category: None,
                date: None,
            },
            &actor(),
        )
        .await
        .unwrap();

        let stats = general_stats(&db).await.unwrap();
        assert_eq!(stats.work_order_count, 3);
        assert_eq!(stats.open_work_order_count, 1);
        assert_eq!(stats.cancelled_work_order_count, 1);
        assert_eq!(stats.customer_count, 0);
        assert_eq!(stats.total_revenue, dec!(50));
        assert_eq!(stats.total_margin, dec!(30));
        assert_eq!(stats.accessory_sale_count, 1);
        assert_eq!(stats.accessory_margin, dec!(5));
        assert_eq!(stats.expense_total, dec!(12.5));
        assert_eq!(stats.net_profit, dec!(22.5));
    }

    #[tokio::test]
    async fn work_order_detail_shows_lines_and_creator() {
        let db = test_connection().await;
        db.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            r#"INSERT INTO sys_users (id, username, password_hash, role, is_approved, is_active, created_at, updated_at)
               VALUES (?, 'admin', 'x', 'admin', 1, 1, ?, ?)"#,
            [
                "u-admin".into(),
                time::to_db(time::now()).into(),
                time::to_db(time::now()).into(),
            ],
        ))
        .await
        .unwrap();

        let order = work_orders::create(
            &db,
            order_dto(
                "A",
                vec![
                    NewLineItemDto::new("Filtre", 2, dec!(10), dec!(25)),
                    NewLineItemDto::new("Zarar", 1, dec!(100), dec!(80)),
                ],
            ),
            &actor(),
        )
        .await
        .unwrap();

        let detail = work_order_detail(&db, order.id).await.unwrap();
        assert_eq!(detail.created_by_username.as_deref(), Some("admin"));
        assert_eq!(detail.lines.len(), 2);
        assert_eq!(detail.lines[0].line_margin, dec!(30));
        assert_eq!(detail.lines[1].line_margin, dec!(-20));
        assert_eq!(detail.margin_percent, dec!(7.69));

        assert!(matches!(
            work_order_detail(&db, WorkOrderId(999)).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
