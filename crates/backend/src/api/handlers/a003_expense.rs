use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    Json,
};
use contracts::domain::a003_expense::aggregate::{
    CreateExpenseDto, Expense, ExpenseId, ExpenseListFilter, UpdateExpenseDto,
};

use crate::domain::a003_expense::service;
use crate::shared::activity_log::Actor;
use crate::shared::data::db::get_connection;
use crate::shared::error::ServiceError;

/// GET /api/expenses?date=&category=
pub async fn list(
    query: Result<Query<ExpenseListFilter>, QueryRejection>,
) -> Result<Json<Vec<Expense>>, ServiceError> {
    let Query(filter) = query?;
    let db = get_connection()?;
    Ok(Json(service::list(db, &filter).await?))
}

/// GET /api/expenses/:id
pub async fn get_by_id(
    path: Result<Path<ExpenseId>, PathRejection>,
) -> Result<Json<Expense>, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    Ok(Json(service::get(db, id).await?))
}

/// POST /api/expenses
pub async fn create(
    actor: Actor,
    payload: Result<Json<CreateExpenseDto>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), ServiceError> {
    let Json(dto) = payload?;
    let db = get_connection()?;
    let expense = service::create(db, dto, &actor).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// PUT /api/expenses/:id
pub async fn update(
    actor: Actor,
    path: Result<Path<ExpenseId>, PathRejection>,
    payload: Result<Json<UpdateExpenseDto>, JsonRejection>,
) -> Result<Json<Expense>, ServiceError> {
    let Path(id) = path?;
    let Json(dto) = payload?;
    let db = get_connection()?;
    Ok(Json(service::update(db, id, dto, &actor).await?))
}

/// DELETE /api/expenses/:id
pub async fn delete(
    actor: Actor,
    path: Result<Path<ExpenseId>, PathRejection>,
) -> Result<StatusCode, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    service::delete(db, id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
