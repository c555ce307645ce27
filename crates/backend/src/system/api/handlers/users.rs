use axum::{extract::Path, http::StatusCode, Json};
use contracts::system::users::User;

use crate::shared::activity_log::Actor;
use crate::shared::data::db::get_connection;
use crate::shared::error::ServiceError;
use crate::system::users::service;

/// List all users (admin only)
pub async fn list() -> Result<Json<Vec<User>>, ServiceError> {
    let db = get_connection()?;
    Ok(Json(service::list(db).await?))
}

/// Approve a registered account (admin only)
pub async fn approve(actor: Actor, Path(id): Path<String>) -> Result<Json<User>, ServiceError> {
    let db = get_connection()?;
    Ok(Json(service::approve(db, &id, &actor).await?))
}

/// Deactivate an account (admin only)
pub async fn deactivate(actor: Actor, Path(id): Path<String>) -> Result<Json<User>, ServiceError> {
    let db = get_connection()?;
    Ok(Json(service::deactivate(db, &id, &actor).await?))
}

/// Delete user (admin only)
pub async fn delete(actor: Actor, Path(id): Path<String>) -> Result<StatusCode, ServiceError> {
    let db = get_connection()?;
    service::delete(db, &id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
