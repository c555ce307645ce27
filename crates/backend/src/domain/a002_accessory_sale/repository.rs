use std::collections::HashMap;

use chrono::{DateTime, Utc};
use contracts::domain::a002_accessory_sale::aggregate::{
    AccessoryPart, AccessorySale, AccessorySaleId, AccessorySaleStatus, PaymentMethod,
};
use contracts::domain::common::{DocumentStatus, EntityMetadata};
use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, QueryResult, Statement, Value};

use crate::shared::data::row;
use crate::shared::time;
use crate::shared::validation::ValidLine;

const SELECT_SALE: &str = r#"
    SELECT id, customer_name, phone, product, payment_method, payment_details,
           total_cost_minor, total_sale_minor, margin_minor,
           status, completed_at, created_at, updated_at, created_by
    FROM a002_accessory_sale
"#;

fn sale_from_row(row: &QueryResult) -> Result<AccessorySale, DbErr> {
    let status_text: String = row.try_get("", "status")?;
    let status = AccessorySaleStatus::parse(&status_text)
        .ok_or_else(|| DbErr::Type(format!("unknown accessory sale status '{}'", status_text)))?;
    let method_text: String = row.try_get("", "payment_method")?;
    let payment_method = PaymentMethod::parse(&method_text)
        .ok_or_else(|| DbErr::Type(format!("unknown payment method '{}'", method_text)))?;

    Ok(AccessorySale {
        id: AccessorySaleId(row.try_get("", "id")?),
        customer_name: row.try_get("", "customer_name")?,
        phone: row.try_get("", "phone")?,
        product: row.try_get("", "product")?,
        payment_method,
        payment_details: row.try_get("", "payment_details")?,
        total_cost: row::amount(row, "total_cost_minor")?,
        total_sale: row::amount(row, "total_sale_minor")?,
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

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    sale: &AccessorySale,
) -> Result<AccessorySaleId, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            r#"
            INSERT INTO a002_accessory_sale (
                customer_name, phone, product, payment_method, payment_details,
                total_cost_minor, total_sale_minor, margin_minor,
                status, completed_at, created_at, updated_at, created_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            [
                sale.customer_name.clone().into(),
                sale.phone.clone().into(),
                sale.product.clone().into(),
                sale.payment_method.as_str().into(),
                sale.payment_details.clone().into(),
                row::minor(sale.total_cost)?.into(),
                row::minor(sale.total_sale)?.into(),
                row::minor(sale.margin)?.into(),
                sale.status.as_str().into(),
                sale.completed_at.map(time::to_db).into(),
                time::to_db(sale.metadata.created_at).into(),
                time::to_db(sale.metadata.updated_at).into(),
                sale.metadata.created_by.clone().into(),
            ],
        ))
        .await?;
    Ok(AccessorySaleId(result.last_insert_id() as i64))
}

pub async fn update_header<C: ConnectionTrait>(conn: &C, sale: &AccessorySale) -> Result<(), DbErr> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        r#"
        UPDATE a002_accessory_sale SET
            customer_name = ?, phone = ?, product = ?, payment_method = ?, payment_details = ?,
            total_cost_minor = ?, total_sale_minor = ?, margin_minor = ?,
            status = ?, completed_at = ?, updated_at = ?
        WHERE id = ?
        "#,
        [
            sale.customer_name.clone().into(),
            sale.phone.clone().into(),
            sale.product.clone().into(),
            sale.payment_method.as_str().into(),
            sale.payment_details.clone().into(),
            row::minor(sale.total_cost)?.into(),
            row::minor(sale.total_sale)?.into(),
            row::minor(sale.margin)?.into(),
            sale.status.as_str().into(),
            sale.completed_at.map(time::to_db).into(),
            time::to_db(sale.metadata.updated_at).into(),
            sale.id.value().into(),
        ],
    ))
    .await?;
    Ok(())
}

/// Part codes are not kept for accessory lines
pub async fn insert_part<C: ConnectionTrait>(
    conn: &C,
    sale_id: AccessorySaleId,
    line: &ValidLine,
) -> Result<AccessoryPart, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            r#"
            INSERT INTO a002_accessory_sale_part
                (accessory_sale_id, name, quantity, unit_cost_minor, unit_sale_price_minor)
            VALUES (?, ?, ?, ?, ?)
            "#,
            [
                sale_id.value().into(),
                line.name.clone().into(),
                line.quantity.into(),
                row::minor(line.unit_cost)?.into(),
                row::minor(line.unit_sale_price)?.into(),
            ],
        ))
        .await?;

    Ok(AccessoryPart {
        id: result.last_insert_id() as i64,
        name: line.name.clone(),
        quantity: line.quantity,
        unit_cost: line.unit_cost,
        unit_sale_price: line.unit_sale_price,
    })
}

pub async fn delete_part<C: ConnectionTrait>(
    conn: &C,
    sale_id: AccessorySaleId,
    part_id: i64,
) -> Result<bool, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM a002_accessory_sale_part WHERE id = ? AND accessory_sale_id = ?",
            [part_id.into(), sale_id.value().into()],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_parts<C: ConnectionTrait>(conn: &C, sale_id: AccessorySaleId) -> Result<u64, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM a002_accessory_sale_part WHERE accessory_sale_id = ?",
            [sale_id.value().into()],
        ))
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete<C: ConnectionTrait>(conn: &C, id: AccessorySaleId) -> Result<bool, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM a002_accessory_sale WHERE id = ?",
            [id.value().into()],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find<C: ConnectionTrait>(
    conn: &C,
    id: AccessorySaleId,
) -> Result<Option<AccessorySale>, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            format!("{} WHERE id = ?", SELECT_SALE),
            [id.value().into()],
        ))
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut sale = sale_from_row(&row)?;
    sale.parts = load_parts(conn, &[id.value()])
        .await?
        .remove(&id.value())
        .unwrap_or_default();
    Ok(Some(sale))
}

/// Sales by status and creation range `[from, to)`, newest first
pub async fn list<C: ConnectionTrait>(
    conn: &C,
    status: Option<AccessorySaleStatus>,
    created: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<Vec<AccessorySale>, DbErr> {
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
    let sql = format!("{} {} ORDER BY id DESC", SELECT_SALE, where_clause);

    let rows = conn
        .query_all(Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values))
        .await?;
    let mut sales = rows
        .iter()
        .map(sale_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let ids: Vec<i64> = sales.iter().map(|s| s.id.value()).collect();
    let mut parts = load_parts(conn, &ids).await?;
    for sale in &mut sales {
        sale.parts = parts.remove(&sale.id.value()).unwrap_or_default();
    }
    Ok(sales)
}

async fn load_parts<C: ConnectionTrait>(
    conn: &C,
    sale_ids: &[i64],
) -> Result<HashMap<i64, Vec<AccessoryPart>>, DbErr> {
    let mut by_sale: HashMap<i64, Vec<AccessoryPart>> = HashMap::new();
    if sale_ids.is_empty() {
        return Ok(by_sale);
    }

    for chunk in sale_ids.chunks(row::ID_CHUNK) {
        let sql = format!(
            r#"
            SELECT id, accessory_sale_id, name, quantity, unit_cost_minor, unit_sale_price_minor
            FROM a002_accessory_sale_part
            WHERE accessory_sale_id IN ({})
            ORDER BY id
            "#,
            vec!["?"; chunk.len()].join(", ")
        );
        let values: Vec<Value> = chunk.iter().map(|id| (*id).into()).collect();

        let rows = conn
            .query_all(Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values))
            .await?;
        for row in &rows {
            let sale_id: i64 = row.try_get("", "accessory_sale_id")?;
            by_sale.entry(sale_id).or_default().push(AccessoryPart {
                id: row.try_get("", "id")?,
                name: row.try_get("", "name")?,
                quantity: row.try_get("", "quantity")?,
                unit_cost: row::amount(row, "unit_cost_minor")?,
                unit_sale_price: row::amount(row, "unit_sale_price_minor")?,
            });
        }
    }
    Ok(by_sale)
}

#[cfg(test)]
pub async fn count_parts<C: ConnectionTrait>(conn: &C, sale_id: AccessorySaleId) -> Result<i64, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) AS cnt FROM a002_accessory_sale_part WHERE accessory_sale_id = ?",
            [sale_id.value().into()],
        ))
        .await?;
    row::count(row)
}
