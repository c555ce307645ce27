use std::collections::HashMap;

use chrono::{DateTime, Utc};
use contracts::domain::a001_work_order::aggregate::{
    Part, WorkOrder, WorkOrderId, WorkOrderStatus,
};
use contracts::domain::common::{DocumentStatus, EntityMetadata};
use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, QueryResult, Statement, Value};

use crate::shared::data::row;
use crate::shared::time;
use crate::shared::validation::ValidLine;

const SELECT_WORK_ORDER: &str = r#"
    SELECT id, fis_no, customer_name, phone, customer_note,
           vehicle_brand, vehicle_model, odometer_km,
           description, work_performed, delivery_note,
           estimated_fee_minor, actual_fee_minor, total_cost_minor, margin_minor,
           status, completed_at, created_at, updated_at, created_by
    FROM a001_work_order
"#;

fn work_order_from_row(row: &QueryResult) -> Result<WorkOrder, DbErr> {
    let status_text: String = row.try_get("", "status")?;
    let status = WorkOrderStatus::parse(&status_text)
        .ok_or_else(|| DbErr::Type(format!("unknown work order status '{}'", status_text)))?;

    Ok(WorkOrder {
        id: WorkOrderId(row.try_get("", "id")?),
        fis_no: row.try_get("", "fis_no")?,
        customer_name: row.try_get("", "customer_name")?,
        phone: row.try_get("", "phone")?,
        customer_note: row.try_get("", "customer_note")?,
        vehicle_brand: row.try_get("", "vehicle_brand")?,
        vehicle_model: row.try_get("", "vehicle_model")?,
        odometer_km: row.try_get("", "odometer_km")?,
        description: row.try_get("", "description")?,
        work_performed: row.try_get("", "work_performed")?,
        delivery_note: row.try_get("", "delivery_note")?,
        estimated_fee: row::amount(row, "estimated_fee_minor")?,
        actual_fee: row::amount(row, "actual_fee_minor")?,
        total_cost: row::amount(row, "total_cost_minor")?,
        margin: row::amount(row, "margin_minor")?,
        status,
        completed_at: row::opt_timestamp(row, "completed_at")?,
        parts: Vec::new(),
        metadata: EntityMetadata {
            created_at: row::timestamp(row, "created_at")?,
            updated_at: row::timestamp(row, "updated_at")?,
            created_by: row.try_get("", "created_by")?,
        },
    })
}

fn part_from_row(row: &QueryResult) -> Result<(i64, Part), DbErr> {
    let work_order_id: i64 = row.try_get("", "work_order_id")?;
    let part = Part {
        id: row.try_get("", "id")?,
        code: row.try_get("", "code")?,
        name: row.try_get("", "name")?,
        quantity: row.try_get("", "quantity")?,
        unit_cost: row::amount(row, "unit_cost_minor")?,
        unit_sale_price: row::amount(row, "unit_sale_price_minor")?,
    };
    Ok((work_order_id, part))
}

/// Insert the header row; parts are written separately
pub async fn insert<C: ConnectionTrait>(conn: &C, order: &WorkOrder) -> Result<WorkOrderId, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            r#"
            INSERT INTO a001_work_order (
                fis_no, customer_name, phone, customer_note,
                vehicle_brand, vehicle_model, odometer_km,
                description, work_performed, delivery_note,
                estimated_fee_minor, actual_fee_minor, total_cost_minor, margin_minor,
                status, completed_at, created_at, updated_at, created_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            [
                order.fis_no.into(),
                order.customer_name.clone().into(),
                order.phone.clone().into(),
                order.customer_note.clone().into(),
                order.vehicle_brand.clone().into(),
                order.vehicle_model.clone().into(),
                order.odometer_km.into(),
                order.description.clone().into(),
                order.work_performed.clone().into(),
                order.delivery_note.clone().into(),
                row::minor(order.estimated_fee)?.into(),
                row::minor(order.actual_fee)?.into(),
                row::minor(order.total_cost)?.into(),
                row::minor(order.margin)?.into(),
                order.status.as_str().into(),
                order.completed_at.map(time::to_db).into(),
                time::to_db(order.metadata.created_at).into(),
                time::to_db(order.metadata.updated_at).into(),
                order.metadata.created_by.clone().into(),
            ],
        ))
        .await?;
    Ok(WorkOrderId(result.last_insert_id() as i64))
}

/// Write every mutable header column, derived totals included
pub async fn update_header<C: ConnectionTrait>(conn: &C, order: &WorkOrder) -> Result<(), DbErr> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        r#"
        UPDATE a001_work_order SET
            customer_name = ?, phone = ?, customer_note = ?,
            vehicle_brand = ?, vehicle_model = ?, odometer_km = ?,
            description = ?, work_performed = ?, delivery_note = ?,
            estimated_fee_minor = ?, actual_fee_minor = ?, total_cost_minor = ?, margin_minor = ?,
            status = ?, completed_at = ?, updated_at = ?
        WHERE id = ?
        "#,
        [
            order.customer_name.clone().into(),
            order.phone.clone().into(),
            order.customer_note.clone().into(),
            order.vehicle_brand.clone().into(),
            order.vehicle_model.clone().into(),
            order.odometer_km.into(),
            order.description.clone().into(),
            order.work_performed.clone().into(),
            order.delivery_note.clone().into(),
            row::minor(order.estimated_fee)?.into(),
            row::minor(order.actual_fee)?.into(),
            row::minor(order.total_cost)?.into(),
            row::minor(order.margin)?.into(),
            order.status.as_str().into(),
            order.completed_at.map(time::to_db).into(),
            time::to_db(order.metadata.updated_at).into(),
            order.id.value().into(),
        ],
    ))
    .await?;
    Ok(())
}

pub async fn insert_part<C: ConnectionTrait>(
    conn: &C,
    work_order_id: WorkOrderId,
    line: &ValidLine,
) -> Result<Part, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            r#"
            INSERT INTO a001_work_order_part
                (work_order_id, code, name, quantity, unit_cost_minor, unit_sale_price_minor)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            [
                work_order_id.value().into(),
                line.code.clone().into(),
                line.name.clone().into(),
                line.quantity.into(),
                row::minor(line.unit_cost)?.into(),
                row::minor(line.unit_sale_price)?.into(),
            ],
        ))
        .await?;

    Ok(Part {
        id: result.last_insert_id() as i64,
        code: line.code.clone(),
        name: line.name.clone(),
        quantity: line.quantity,
        unit_cost: line.unit_cost,
        unit_sale_price: line.unit_sale_price,
    })
}

/// Delete one part of the given order. A part of another order is not touched.
pub async fn delete_part<C: ConnectionTrait>(
    conn: &C,
    work_order_id: WorkOrderId,
    part_id: i64,
) -> Result<bool, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM a001_work_order_part WHERE id = ? AND work_order_id = ?",
            [part_id.into(), work_order_id.value().into()],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_parts<C: ConnectionTrait>(
    conn: &C,
    work_order_id: WorkOrderId,
) -> Result<u64, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM a001_work_order_part WHERE work_order_id = ?",
            [work_order_id.value().into()],
        ))
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete<C: ConnectionTrait>(conn: &C, id: WorkOrderId) -> Result<bool, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM a001_work_order WHERE id = ?",
            [id.value().into()],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Work order with its parts
pub async fn find<C: ConnectionTrait>(conn: &C, id: WorkOrderId) -> Result<Option<WorkOrder>, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            format!("{} WHERE id = ?", SELECT_WORK_ORDER),
            [id.value().into()],
        ))
        .await?;

    let mut order = match row {
        Some(row) => work_order_from_row(&row)?,
        None => return Ok(None),
    };
    order.parts = load_parts(conn, &[id.value()])
        .await?
        .remove(&id.value())
        .unwrap_or_default();
    Ok(Some(order))
}

/// Work orders filtered by status and creation range `[from, to)`, newest id first
pub async fn list<C: ConnectionTrait>(
    conn: &C,
    status: Option<WorkOrderStatus>,
    created: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<Vec<WorkOrder>, DbErr> {
    let mut conditions: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(status) = status {
        conditions.push("status = ?");
        values.push(status.as_str().into());
    }
    if let Some((from, to)) = created {
        conditions.push("created_at >= ? AND created_at < ?");
        values.push(time::to_db(from).into());
        values.push(time::to_db(to).into());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!("{} {} ORDER BY id DESC", SELECT_WORK_ORDER, where_clause);

    let rows = conn
        .query_all(Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values))
        .await?;
    let mut orders = rows
        .iter()
        .map(work_order_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let ids: Vec<i64> = orders.iter().map(|o| o.id.value()).collect();
    let mut parts = load_parts(conn, &ids).await?;
    for order in &mut orders {
        order.parts = parts.remove(&order.id.value()).unwrap_or_default();
    }
    Ok(orders)
}

/// Parts of several orders keyed by order id, in insertion order
async fn load_parts<C: ConnectionTrait>(
    conn: &C,
    work_order_ids: &[i64],
) -> Result<HashMap<i64, Vec<Part>>, DbErr> {
    let mut by_order: HashMap<i64, Vec<Part>> = HashMap::new();
    if work_order_ids.is_empty() {
        return Ok(by_order);
    }

    for chunk in work_order_ids.chunks(row::ID_CHUNK) {
        let sql = format!(
            r#"
            SELECT id, work_order_id, code, name, quantity, unit_cost_minor, unit_sale_price_minor
            FROM a001_work_order_part
            WHERE work_order_id IN ({})
            ORDER BY id
            "#,
            vec!["?"; chunk.len()].join(", ")
        );
        let values: Vec<Value> = chunk.iter().map(|id| (*id).into()).collect();

        let rows = conn
            .query_all(Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values))
            .await?;
        for row in &rows {
            let (work_order_id, part) = part_from_row(row)?;
            by_order.entry(work_order_id).or_default().push(part);
        }
    }
    Ok(by_order)
}

#[cfg(test)]
pub async fn count_parts<C: ConnectionTrait>(conn: &C, work_order_id: WorkOrderId) -> Result<i64, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) AS cnt FROM a001_work_order_part WHERE work_order_id = ?",
            [work_order_id.value().into()],
        ))
        .await?;
    row::count(row)
}
