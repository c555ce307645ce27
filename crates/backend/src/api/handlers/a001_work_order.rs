use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    Json,
};
use contracts::domain::a001_work_order::aggregate::{
    CreateWorkOrderDto, NextReceiptNumber, UpdateWorkOrderDto, WorkOrder, WorkOrderId,
    WorkOrderListFilter,
};
use contracts::domain::common::NewLineItemDto;

use crate::domain::a001_work_order::service;
use crate::shared::activity_log::Actor;
use crate::shared::data::db::get_connection;
use crate::shared::error::ServiceError;

/// GET /api/work-orders?status=&date=
pub async fn list(
    query: Result<Query<WorkOrderListFilter>, QueryRejection>,
) -> Result<Json<Vec<WorkOrder>>, ServiceError> {
    let Query(filter) = query?;
    let db = get_connection()?;
    Ok(Json(service::list(db, &filter).await?))
}

/// GET /api/work-orders/:id
pub async fn get_by_id(
    path: Result<Path<WorkOrderId>, PathRejection>,
) -> Result<Json<WorkOrder>, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    Ok(Json(service::get(db, id).await?))
}

/// POST /api/work-orders
pub async fn create(
    actor: Actor,
    payload: Result<Json<CreateWorkOrderDto>, JsonRejection>,
) -> Result<(StatusCode, Json<WorkOrder>), ServiceError> {
    let Json(dto) = payload?;
    let db = get_connection()?;
    let order = service::create(db, dto, &actor).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT /api/work-orders/:id
pub async fn update(
    actor: Actor,
    path: Result<Path<WorkOrderId>, PathRejection>,
    payload: Result<Json<UpdateWorkOrderDto>, JsonRejection>,
) -> Result<Json<WorkOrder>, ServiceError> {
    let Path(id) = path?;
    let Json(dto) = payload?;
    let db = get_connection()?;
    Ok(Json(service::update(db, id, dto, &actor).await?))
}

/// DELETE /api/work-orders/:id
pub async fn delete(
    actor: Actor,
    path: Result<Path<WorkOrderId>, PathRejection>,
) -> Result<StatusCode, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    service::delete(db, id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/work-orders/:id/complete
pub async fn complete(
    actor: Actor,
    path: Result<Path<WorkOrderId>, PathRejection>,
) -> Result<Json<WorkOrder>, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    Ok(Json(service::complete(db, id, &actor).await?))
}

/// POST /api/work-orders/:id/line-items
pub async fn add_line_item(
    actor: Actor,
    path: Result<Path<WorkOrderId>, PathRejection>,
    payload: Result<Json<NewLineItemDto>, JsonRejection>,
) -> Result<(StatusCode, Json<WorkOrder>), ServiceError> {
    let Path(id) = path?;
    let Json(item) = payload?;
    let db = get_connection()?;
    let order = service::add_line_item(db, id, item, &actor).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// DELETE /api/work-orders/:id/line-items/:line_item_id
pub async fn remove_line_item(
    actor: Actor,
    path: Result<Path<(WorkOrderId, i64)>, PathRejection>,
) -> Result<Json<WorkOrder>, ServiceError> {
    let Path((id, line_item_id)) = path?;
    let db = get_connection()?;
    Ok(Json(
        service::remove_line_item(db, id, line_item_id, &actor).await?,
    ))
}

/// GET /api/work-orders/next-receipt-number/preview
pub async fn next_receipt_number() -> Result<Json<NextReceiptNumber>, ServiceError> {
    let db = get_connection()?;
    let fis_no = service::peek_next_fis_no(db).await?;
    Ok(Json(NextReceiptNumber { fis_no }))
}
