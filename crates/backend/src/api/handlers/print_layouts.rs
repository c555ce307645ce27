use axum::{
    extract::{rejection::JsonRejection, Path},
    Json,
};
use contracts::shared::print_layout::{PrintLayout, SavePrintLayoutRequest};

use crate::shared::activity_log::{self, ActivityEvent, Actor};
use crate::shared::data::db::get_connection;
use crate::shared::error::ServiceError;
use crate::shared::print_layout;

/// GET /api/print-layouts/:key
pub async fn get(Path(layout_key): Path<String>) -> Result<Json<PrintLayout>, ServiceError> {
    let db = get_connection()?;
    Ok(Json(print_layout::get(db, &layout_key).await?))
}

/// PUT /api/print-layouts/:key
pub async fn save(
    actor: Actor,
    Path(layout_key): Path<String>,
    payload: Result<Json<SavePrintLayoutRequest>, JsonRejection>,
) -> Result<Json<PrintLayout>, ServiceError> {
    let Json(request) = payload?;
    let db = get_connection()?;
    let layout = print_layout::save(db, &layout_key, &request.document).await?;

    activity_log::record(
        db,
        ActivityEvent::new(&actor, "save", "sys_print_layouts")
            .entity_id(&layout.layout_key)
            .details(format!("version {}", layout.version)),
    );
    Ok(Json(layout))
}
