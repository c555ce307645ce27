use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    Json,
};
use contracts::domain::a004_customer::aggregate::{
    CreateCustomerDto, Customer, CustomerId, CustomerListFilter, UpdateCustomerDto,
};

use crate::domain::a004_customer::service;
use crate::shared::activity_log::Actor;
use crate::shared::data::db::get_connection;
use crate::shared::error::ServiceError;

/// GET /api/customers?search=
pub async fn list(
    query: Result<Query<CustomerListFilter>, QueryRejection>,
) -> Result<Json<Vec<Customer>>, ServiceError> {
    let Query(filter) = query?;
    let db = get_connection()?;
    Ok(Json(service::list(db, &filter).await?))
}

/// GET /api/customers/:id
pub async fn get_by_id(
    path: Result<Path<CustomerId>, PathRejection>,
) -> Result<Json<Customer>, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    Ok(Json(service::get(db, id).await?))
}

/// POST /api/customers
pub async fn create(
    actor: Actor,
    payload: Result<Json<CreateCustomerDto>, JsonRejection>,
) -> Result<(StatusCode, Json<Customer>), ServiceError> {
    let Json(dto) = payload?;
    let db = get_connection()?;
    let customer = service::create(db, dto, &actor).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /api/customers/:id
pub async fn update(
    actor: Actor,
    path: Result<Path<CustomerId>, PathRejection>,
    payload: Result<Json<UpdateCustomerDto>, JsonRejection>,
) -> Result<Json<Customer>, ServiceError> {
    let Path(id) = path?;
    let Json(dto) = payload?;
    let db = get_connection()?;
    Ok(Json(service::update(db, id, dto, &actor).await?))
}

/// DELETE /api/customers/:id
pub async fn delete(
    actor: Actor,
    path: Result<Path<CustomerId>, PathRejection>,
) -> Result<StatusCode, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    service::delete(db, id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
