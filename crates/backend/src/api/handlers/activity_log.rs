use axum::{
    extract::{rejection::QueryRejection, Query},
    Json,
};
use contracts::shared::activity_log::{ActivityLogEntry, ActivityLogQuery};

use crate::shared::activity_log::repository;
use crate::shared::data::db::get_connection;
use crate::shared::error::ServiceError;

/// GET /api/activity-log?limit=
pub async fn list(
    query: Result<Query<ActivityLogQuery>, QueryRejection>,
) -> Result<Json<Vec<ActivityLogEntry>>, ServiceError> {
    let Query(query) = query?;
    let db = get_connection()?;
    Ok(Json(repository::list(db, query.limit).await?))
}
