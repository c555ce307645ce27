use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    Json,
};
use contracts::domain::a002_accessory_sale::aggregate::{
    AccessorySale, AccessorySaleId, AccessorySaleListFilter, CreateAccessorySaleDto,
    UpdateAccessorySaleDto,
};
use contracts::domain::common::NewLineItemDto;

use crate::domain::a002_accessory_sale::service;
use crate::shared::activity_log::Actor;
use crate::shared::data::db::get_connection;
use crate::shared::error::ServiceError;

/// GET /api/accessory-sales?status=&date=
pub async fn list(
    query: Result<Query<AccessorySaleListFilter>, QueryRejection>,
) -> Result<Json<Vec<AccessorySale>>, ServiceError> {
    let Query(filter) = query?;
    let db = get_connection()?;
    Ok(Json(service::list(db, &filter).await?))
}

/// GET /api/accessory-sales/:id
pub async fn get_by_id(
    path: Result<Path<AccessorySaleId>, PathRejection>,
) -> Result<Json<AccessorySale>, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    Ok(Json(service::get(db, id).await?))
}

/// POST /api/accessory-sales
pub async fn create(
    actor: Actor,
    payload: Result<Json<CreateAccessorySaleDto>, JsonRejection>,
) -> Result<(StatusCode, Json<AccessorySale>), ServiceError> {
    let Json(dto) = payload?;
    let db = get_connection()?;
    let sale = service::create(db, dto, &actor).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// PUT /api/accessory-sales/:id
pub async fn update(
    actor: Actor,
    path: Result<Path<AccessorySaleId>, PathRejection>,
    payload: Result<Json<UpdateAccessorySaleDto>, JsonRejection>,
) -> Result<Json<AccessorySale>, ServiceError> {
    let Path(id) = path?;
    let Json(dto) = payload?;
    let db = get_connection()?;
    Ok(Json(service::update(db, id, dto, &actor).await?))
}

/// DELETE /api/accessory-sales/:id
pub async fn delete(
    actor: Actor,
    path: Result<Path<AccessorySaleId>, PathRejection>,
) -> Result<StatusCode, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    service::delete(db, id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/accessory-sales/:id/complete
pub async fn complete(
    actor: Actor,
    path: Result<Path<AccessorySaleId>, PathRejection>,
) -> Result<Json<AccessorySale>, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    Ok(Json(service::complete(db, id, &actor).await?))
}

/// POST /api/accessory-sales/:id/line-items
pub async fn add_line_item(
    actor: Actor,
    path: Result<Path<AccessorySaleId>, PathRejection>,
    payload: Result<Json<NewLineItemDto>, JsonRejection>,
) -> Result<(StatusCode, Json<AccessorySale>), ServiceError> {
    let Path(id) = path?;
    let Json(item) = payload?;
    let db = get_connection()?;
    let sale = service::add_line_item(db, id, item, &actor).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// DELETE /api/accessory-sales/:id/line-items/:line_item_id
pub async fn remove_line_item(
    actor: Actor,
    path: Result<Path<(AccessorySaleId, i64)>, PathRejection>,
) -> Result<Json<AccessorySale>, ServiceError> {
    let Path((id, line_item_id)) = path?;
    let db = get_connection()?;
    Ok(Json(
        service::remove_line_item(db, id, line_item_id, &actor).await?,
    ))
}
