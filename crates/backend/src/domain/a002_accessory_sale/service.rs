use contracts::domain::a002_accessory_sale::aggregate::{
    AccessorySale, AccessorySaleId, AccessorySaleListFilter, CreateAccessorySaleDto,
    UpdateAccessorySaleDto,
};
use contracts::domain::common::{AggregateRoot, EntityMetadata, NewLineItemDto};
use sea_orm::{DatabaseConnection, TransactionTrait};

use super::repository;
use crate::shared::activity_log::{self, ActivityEvent, Actor};
use crate::shared::error::{ServiceError, ServiceResult};
use crate::shared::format::format_money;
use crate::shared::time;
use crate::shared::validation::{self, merge_text};

const ENTITY: &str = "a002_accessory_sale";

fn not_found(id: AccessorySaleId) -> ServiceError {
    ServiceError::not_found(ENTITY, id)
}

fn audit(db: &DatabaseConnection, actor: &Actor, action: &str, sale: &AccessorySale, details: String) {
    activity_log::record(
        db,
        ActivityEvent::new(actor, action, &AccessorySale::full_name())
            .entity_id(sale.id)
            .details(details),
    );
}

pub async fn create(
    db: &DatabaseConnection,
    dto: CreateAccessorySaleDto,
    actor: &Actor,
) -> ServiceResult<AccessorySale> {
    validation::reject_derived_fields(&dto.derived)?;
    let customer_name = validation::required_text(&dto.customer_name, "musteri_adi")?;
    let lines = validation::line_items(&dto.parts)?;

    let mut sale = AccessorySale::blank(customer_name, actor.user_id.clone());
    sale.metadata = EntityMetadata::stamped(time::now(), actor.user_id.clone());
    sale.phone = validation::optional_text(dto.phone);
    sale.product = validation::optional_text(dto.product);
    sale.payment_method = dto.payment_method;
    sale.payment_details = validation::optional_text(dto.payment_details);

    let txn = db.begin().await?;
    sale.id = repository::insert(&txn, &sale).await?;
    for line in &lines {
        let part = repository::insert_part(&txn, sale.id, line).await?;
        sale.parts.push(part);
    }
    sale.recompute();
    repository::update_header(&txn, &sale).await?;
    txn.commit().await?;

    tracing::info!("Created accessory sale {} for '{}'", sale.code(), sale.customer_name);
    audit(
        db,
        actor,
        "create",
        &sale,
        format!("{} {}", sale.code(), format_money(sale.total_sale)),
    );
    Ok(sale)
}

pub async fn add_line_item(
    db: &DatabaseConnection,
    id: AccessorySaleId,
    item: NewLineItemDto,
    actor: &Actor,
) -> ServiceResult<AccessorySale> {
    let line = validation::line_item(&item, "")?;

    let txn = db.begin().await?;
    let mut sale = repository::find(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let part = repository::insert_part(&txn, id, &line).await?;
    sale.parts.push(part);
    sale.recompute();
    sale.metadata.touch_at(time::now());
    repository::update_header(&txn, &sale).await?;
    txn.commit().await?;

    audit(
        db,
        actor,
        "add_line_item",
        &sale,
        format!("{} +{} x{}", sale.code(), line.name, line.quantity),
    );
    Ok(sale)
}

pub async fn remove_line_item(
    db: &DatabaseConnection,
    id: AccessorySaleId,
    line_item_id: i64,
    actor: &Actor,
) -> ServiceResult<AccessorySale> {
    let txn = db.begin().await?;
    let mut sale = repository::find(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !repository::delete_part(&txn, id, line_item_id).await? {
        return Err(ServiceError::not_found("a002_accessory_sale_part", line_item_id));
    }
    sale.parts.retain(|p| p.id != line_item_id);
    sale.recompute();
    sale.metadata.touch_at(time::now());
    repository::update_header(&txn, &sale).await?;
    txn.commit().await?;

    audit(
        db,
        actor,
        "remove_line_item",
        &sale,
        format!("{} -line {}", sale.code(), line_item_id),
    );
    Ok(sale)
}

pub async fn update(
    db: &DatabaseConnection,
    id: AccessorySaleId,
    dto: UpdateAccessorySaleDto,
    actor: &Actor,
) -> ServiceResult<AccessorySale> {
    validation::reject_derived_fields(&dto.derived)?;
    let customer_name = dto
        .customer_name
        .as_deref()
        .map(|name| validation::required_text(name, "musteri_adi"))
        .transpose()?;
    let lines = dto
        .parts
        .as_deref()
        .map(validation::line_items)
        .transpose()?;

    let txn = db.begin().await?;
    let mut sale = repository::find(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(status) = dto.status {
        sale.change_status(status)?;
    }
    if let Some(name) = customer_name {
        sale.customer_name = name;
    }
    if let Some(method) = dto.payment_method {
        sale.payment_method = method;
    }
    merge_text(&mut sale.phone, dto.phone);
    merge_text(&mut sale.product, dto.product);
    merge_text(&mut sale.payment_details, dto.payment_details);
    if let Some(lines) = lines {
        repository::delete_parts(&txn, id).await?;
        sale.parts.clear();
        for line in &lines {
            let part = repository::insert_part(&txn, id, line).await?;
            sale.parts.push(part);
        }
    }

    sale.recompute();
    sale.metadata.touch_at(time::now());
    repository::update_header(&txn, &sale).await?;
    txn.commit().await?;

    audit(db, actor, "update", &sale, sale.code());
    Ok(sale)
}

/// Idempotent; the first completion instant is kept
pub async fn complete(
    db: &DatabaseConnection,
    id: AccessorySaleId,
    actor: &Actor,
) -> ServiceResult<AccessorySale> {
    let txn = db.begin().await?;
    let mut sale = repository::find(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let now = time::now();
    let changed = sale.complete(now)?;
    if changed {
        sale.metadata.touch_at(now);
        repository::update_header(&txn, &sale).await?;
    }
    txn.commit().await?;

    if changed {
        audit(
            db,
            actor,
            "complete",
            &sale,
            format!("{} kar {}", sale.code(), format_money(sale.margin)),
        );
    }
    Ok(sale)
}

pub async fn delete(
    db: &DatabaseConnection,
    id: AccessorySaleId,
    actor: &Actor,
) -> ServiceResult<()> {
    let txn = db.begin().await?;
    let sale = repository::find(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    repository::delete_parts(&txn, id).await?;
    repository::delete(&txn, id).await?;
    txn.commit().await?;

    tracing::info!("Deleted accessory sale {}", sale.code());
    audit(db, actor, "delete", &sale, format!("{} {}", sale.code(), sale.customer_name));
    Ok(())
}

pub async fn get(db: &DatabaseConnection, id: AccessorySaleId) -> ServiceResult<AccessorySale> {
    repository::find(db, id).await?.ok_or_else(|| not_found(id))
}

pub async fn list(
    db: &DatabaseConnection,
    filter: &AccessorySaleListFilter,
) -> ServiceResult<Vec<AccessorySale>> {
    let created = filter
        .date
        .map(|date| time::local_days_utc(date, date, time::display_offset()));
    Ok(repository::list(db, filter.status, created).await?)
}
