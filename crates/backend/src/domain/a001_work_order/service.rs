use contracts::domain::a001_work_order::aggregate::{
    CreateWorkOrderDto, UpdateWorkOrderDto, WorkOrder, WorkOrderId, WorkOrderListFilter,
};
use contracts::domain::common::{AggregateRoot, DocumentStatus, EntityMetadata, NewLineItemDto};
use sea_orm::{DatabaseConnection, TransactionTrait};

use super::repository;
use crate::shared::activity_log::{self, ActivityEvent, Actor};
use crate::shared::data::sequence;
use crate::shared::error::{ServiceError, ServiceResult};
use crate::shared::format::format_money;
use crate::shared::time;
use crate::shared::validation::{self, merge_text};

const ENTITY: &str = "a001_work_order";

fn not_found(id: WorkOrderId) -> ServiceError {
    ServiceError::not_found(ENTITY, id)
}

fn audit(db: &DatabaseConnection, actor: &Actor, action: &str, order: &WorkOrder, details: String) {
    activity_log::record(
        db,
        ActivityEvent::new(actor, action, &WorkOrder::full_name())
            .entity_id(order.id)
            .details(details),
    );
}

/// Open a new work order with the next receipt number
pub async fn create(
    db: &DatabaseConnection,
    dto: CreateWorkOrderDto,
    actor: &Actor,
) -> ServiceResult<WorkOrder> {
    validation::reject_derived_fields(&dto.derived)?;
    let customer_name = validation::required_text(&dto.customer_name, "musteri_adi")?;
    let estimated_fee = validation::amount(
        dto.estimated_fee.unwrap_or_default(),
        "tahmini_toplam_ucret",
    )?;
    let odometer_km = validation::odometer(dto.odometer_km)?;
    let lines = validation::line_items(&dto.parts)?;

    let mut order = WorkOrder::blank(customer_name, actor.user_id.clone());
    order.metadata = EntityMetadata::stamped(time::now(), actor.user_id.clone());
    order.phone = validation::optional_text(dto.phone);
    order.customer_note = validation::optional_text(dto.customer_note);
    order.vehicle_brand = validation::optional_text(dto.vehicle_brand);
    order.vehicle_model = validation::optional_text(dto.vehicle_model);
    order.odometer_km = odometer_km;
    order.description = validation::optional_text(dto.description);
    order.work_performed = validation::optional_text(dto.work_performed);
    order.delivery_note = validation::optional_text(dto.delivery_note);
    order.estimated_fee = estimated_fee;

    let txn = db.begin().await?;
    order.fis_no = sequence::allocate(&txn, sequence::RECEIPT_NUMBER).await?;
    order.id = repository::insert(&txn, &order).await?;
    for line in &lines {
        let part = repository::insert_part(&txn, order.id, line).await?;
        order.parts.push(part);
    }
    order.recompute();
    repository::update_header(&txn, &order).await?;
    txn.commit().await?;

    tracing::info!(
        "Created work order {} (id {}) for '{}'",
        order.code(),
        order.id,
        order.customer_name
    );
    audit(
        db,
        actor,
        "create",
        &order,
        format!("{} {}", order.code(), order.customer_name),
    );
    Ok(order)
}

pub async fn add_line_item(
    db: &DatabaseConnection,
    id: WorkOrderId,
    item: NewLineItemDto,
    actor: &Actor,
) -> ServiceResult<WorkOrder> {
    let line = validation::line_item(&item, "")?;

    let txn = db.begin().await?;
    let mut order = repository::find(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let part = repository::insert_part(&txn, id, &line).await?;
    order.parts.push(part);
    order.recompute();
    order.metadata.touch_at(time::now());
    repository::update_header(&txn, &order).await?;
    txn.commit().await?;

    audit(
        db,
        actor,
        "add_line_item",
        &order,
        format!("{} +{} x{}", order.code(), line.name, line.quantity),
    );
    Ok(order)
}

/// Remove a line item. A line of another work order counts as missing.
pub async fn remove_line_item(
    db: &DatabaseConnection,
    id: WorkOrderId,
    line_item_id: i64,
    actor: &Actor,
) -> ServiceResult<WorkOrder> {
    let txn = db.begin().await?;
    let mut order = repository::find(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !repository::delete_part(&txn, id, line_item_id).await? {
        return Err(ServiceError::not_found("a001_work_order_part", line_item_id));
    }
    order.parts.retain(|p| p.id != line_item_id);
    order.recompute();
    order.metadata.touch_at(time::now());
    repository::update_header(&txn, &order).await?;
    txn.commit().await?;

    audit(
        db,
        actor,
        "remove_line_item",
        &order,
        format!("{} -line {}", order.code(), line_item_id),
    );
    Ok(order)
}

/// Merge the provided fields. Totals are re-derived; they cannot be sent.
pub async fn update(
    db: &DatabaseConnection,
    id: WorkOrderId,
    dto: UpdateWorkOrderDto,
    actor: &Actor,
) -> ServiceResult<WorkOrder> {
    validation::reject_derived_fields(&dto.derived)?;
    let customer_name = dto
        .customer_name
        .as_deref()
        .map(|name| validation::required_text(name, "musteri_adi"))
        .transpose()?;
    let estimated_fee = dto
        .estimated_fee
        .map(|fee| validation::amount(fee, "tahmini_toplam_ucret"))
        .transpose()?;
    let odometer_km = dto
        .odometer_km
        .map(validation::odometer)
        .transpose()?;
    let lines = dto
        .parts
        .as_deref()
        .map(validation::line_items)
        .transpose()?;

    let txn = db.begin().await?;
    let mut order = repository::find(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let previous_status = order.status;

    if let Some(status) = dto.status {
        order.change_status(status)?;
    }
    if let Some(name) = customer_name {
        order.customer_name = name;
    }
    merge_text(&mut order.phone, dto.phone);
    merge_text(&mut order.customer_note, dto.customer_note);
    merge_text(&mut order.vehicle_brand, dto.vehicle_brand);
    merge_text(&mut order.vehicle_model, dto.vehicle_model);
    merge_text(&mut order.description, dto.description);
    merge_text(&mut order.work_performed, dto.work_performed);
    merge_text(&mut order.delivery_note, dto.delivery_note);
    if let Some(km) = odometer_km {
        order.odometer_km = km;
    }
    if let Some(fee) = estimated_fee {
        order.estimated_fee = fee;
    }
    if let Some(lines) = lines {
        repository::delete_parts(&txn, id).await?;
        order.parts.clear();
        for line in &lines {
            let part = repository::insert_part(&txn, id, line).await?;
            order.parts.push(part);
        }
    }

    order.recompute();
    order.metadata.touch_at(time::now());
    repository::update_header(&txn, &order).await?;
    txn.commit().await?;

    let details = if previous_status != order.status {
        format!(
            "{} {} -> {}",
            order.code(),
            previous_status.as_str(),
            order.status.as_str()
        )
    } else {
        order.code()
    };
    audit(db, actor, "update", &order, details);
    Ok(order)
}

/// Mark the order completed. Repeating it succeeds and keeps the first timestamp.
pub async fn complete(
    db: &DatabaseConnection,
    id: WorkOrderId,
    actor: &Actor,
) -> ServiceResult<WorkOrder> {
    let txn = db.begin().await?;
    let mut order = repository::find(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let now = time::now();
    let changed = order.complete(now)?;
    if changed {
        order.metadata.touch_at(now);
        repository::update_header(&txn, &order).await?;
    }
    txn.commit().await?;

    if changed {
        tracing::info!("Completed work order {} (id {})", order.code(), order.id);
        audit(
            db,
            actor,
            "complete",
            &order,
            format!(
                "{} ciro {} kar {}",
                order.code(),
                format_money(order.actual_fee),
                format_money(order.margin)
            ),
        );
    }
    Ok(order)
}

/// Delete the order with its parts. Its receipt number is not handed out again.
pub async fn delete(db: &DatabaseConnection, id: WorkOrderId, actor: &Actor) -> ServiceResult<()> {
    let txn = db.begin().await?;
    let order = repository::find(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    repository::delete_parts(&txn, id).await?;
    repository::delete(&txn, id).await?;
    txn.commit().await?;

    tracing::info!("Deleted work order {} (id {})", order.code(), order.id);
    audit(
        db,
        actor,
        "delete",
        &order,
        format!("{} {}", order.code(), order.customer_name),
    );
    Ok(())
}

pub async fn get(db: &DatabaseConnection, id: WorkOrderId) -> ServiceResult<WorkOrder> {
    repository::find(db, id).await?.ok_or_else(|| not_found(id))
}

/// Orders by id descending; `date` is a local calendar day in the display offset
pub async fn list(
    db: &DatabaseConnection,
    filter: &WorkOrderListFilter,
) -> ServiceResult<Vec<WorkOrder>> {
    let created = filter
        .date
        .map(|date| time::local_days_utc(date, date, time::display_offset()));
    Ok(repository::list(db, filter.status, created).await?)
}

/// Receipt number the next created order will get; nothing is reserved
pub async fn peek_next_fis_no(db: &DatabaseConnection) -> ServiceResult<i64> {
    Ok(sequence::peek(db, sequence::RECEIPT_NUMBER).await?)
}
