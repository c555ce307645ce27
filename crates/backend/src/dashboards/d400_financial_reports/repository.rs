use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, FromQueryResult, Statement};

use crate::shared::time;

/// Work order columns needed by the reports, with the creator's login name
#[derive(Debug, Clone, FromQueryResult)]
pub struct WorkOrderRecord {
    pub id: i64,
    pub fis_no: i64,
    pub customer_name: String,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
    pub status: String,
    pub created_at: String,
    pub created_by: Option<String>,
    pub created_by_username: Option<String>,
    pub actual_fee_minor: i64,
    pub total_cost_minor: i64,
    pub margin_minor: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct AccessorySaleRecord {
    pub id: i64,
    pub customer_name: String,
    pub product: Option<String>,
    pub status: String,
    pub created_at: String,
    pub created_by: Option<String>,
    pub created_by_username: Option<String>,
    pub total_sale_minor: i64,
    pub total_cost_minor: i64,
    pub margin_minor: i64,
}

/// Counts and money sums of one document table. Sums skip cancelled rows.
#[derive(Debug, Clone, Default, FromQueryResult)]
pub struct StatusTotals {
    pub cnt: i64,
    pub open_cnt: i64,
    pub cancelled_cnt: i64,
    pub revenue_minor: i64,
    pub cost_minor: i64,
    pub margin_minor: i64,
}

#[derive(Debug, FromQueryResult)]
struct MinorTotal {
    total_minor: i64,
}

#[derive(Debug, FromQueryResult)]
struct Username {
    username: String,
}

/// Work orders created in `[from, to)`, newest first
pub async fn work_orders_created_between<C: ConnectionTrait>(
    conn: &C,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<WorkOrderRecord>, DbErr> {
    let sql = r#"
        SELECT
            w.id, w.fis_no, w.customer_name, w.vehicle_brand, w.vehicle_model,
            w.status, w.created_at, w.created_by,
            u.username AS created_by_username,
            w.actual_fee_minor, w.total_cost_minor, w.margin_minor
        FROM a001_work_order w
        LEFT JOIN sys_users u ON u.id = w.created_by
        WHERE w.created_at >= ? AND w.created_at < ?
        ORDER BY w.id DESC
    "#;

    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        sql,
        [time::to_db(from).into(), time::to_db(to).into()],
    );
    WorkOrderRecord::find_by_statement(stmt).all(conn).await
}

/// Accessory sales created in `[from, to)`, newest first
pub async fn accessory_sales_created_between<C: ConnectionTrait>(
    conn: &C,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<AccessorySaleRecord>, DbErr> {
    let sql = r#"
        SELECT
            s.id, s.customer_name, s.product, s.status, s.created_at, s.created_by,
            u.username AS created_by_username,
            s.total_sale_minor, s.total_cost_minor, s.margin_minor
        FROM a002_accessory_sale s
        LEFT JOIN sys_users u ON u.id = s.created_by
        WHERE s.created_at >= ? AND s.created_at < ?
        ORDER BY s.id DESC
    "#;

    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        sql,
        [time::to_db(from).into(), time::to_db(to).into()],
    );
    AccessorySaleRecord::find_by_statement(stmt).all(conn).await
}

async fn status_totals<C: ConnectionTrait>(
    conn: &C,
    table: &str,
    revenue_column: &str,
) -> Result<StatusTotals, DbErr> {
    let sql = format!(
        r#"
        SELECT
            COUNT(*) AS cnt,
            COALESCE(SUM(CASE WHEN status NOT IN ('tamamlandi', 'iptal_edildi') THEN 1 ELSE 0 END), 0) AS open_cnt,
            COALESCE(SUM(CASE WHEN status = 'iptal_edildi' THEN 1 ELSE 0 END), 0) AS cancelled_cnt,
            COALESCE(SUM(CASE WHEN status != 'iptal_edildi' THEN {revenue} ELSE 0 END), 0) AS revenue_minor,
            COALESCE(SUM(CASE WHEN status != 'iptal_edildi' THEN total_cost_minor ELSE 0 END), 0) AS cost_minor,
            COALESCE(SUM(CASE WHEN status != 'iptal_edildi' THEN margin_minor ELSE 0 END), 0) AS margin_minor
        FROM {table}
        "#,
        revenue = revenue_column,
        table = table,
    );
    let stmt = Statement::from_string(DatabaseBackend::Sqlite, sql);
    Ok(StatusTotals::find_by_statement(stmt)
        .one(conn)
        .await?
        .unwrap_or_default())
}

pub async fn work_order_totals<C: ConnectionTrait>(conn: &C) -> Result<StatusTotals, DbErr> {
    status_totals(conn, "a001_work_order", "actual_fee_minor").await
}

pub async fn accessory_sale_totals<C: ConnectionTrait>(conn: &C) -> Result<StatusTotals, DbErr> {
    status_totals(conn, "a002_accessory_sale", "total_sale_minor").await
}

/// All-time sum of expenses in minor units
pub async fn expense_total_minor<C: ConnectionTrait>(conn: &C) -> Result<i64, DbErr> {
    let stmt = Statement::from_string(
        DatabaseBackend::Sqlite,
        "SELECT COALESCE(SUM(amount_minor), 0) AS total_minor FROM a003_expense".to_string(),
    );
    Ok(MinorTotal::find_by_statement(stmt)
        .one(conn)
        .await?
        .map(|row| row.total_minor)
        .unwrap_or(0))
}

pub async fn username_of<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
) -> Result<Option<String>, DbErr> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "SELECT username FROM sys_users WHERE id = ?",
        [user_id.into()],
    );
    Ok(Username::find_by_statement(stmt)
        .one(conn)
        .await?
        .map(|row| row.username))
}
