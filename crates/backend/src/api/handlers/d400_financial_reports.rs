use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
use contracts::dashboards::d400_financial_reports::{
    DailySummaryRequest, DailySummaryResponse, GeneralStats, ReceiptProfitRequest,
    ReceiptProfitResponse, WorkOrderDetail,
};
use contracts::domain::a001_work_order::aggregate::WorkOrderId;

use crate::dashboards::d400_financial_reports::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::ServiceError;

/// GET /api/reports/daily?start=&end=
pub async fn daily_summary(
    query: Result<Query<DailySummaryRequest>, QueryRejection>,
) -> Result<Json<DailySummaryResponse>, ServiceError> {
    let Query(request) = query?;
    let db = get_connection()?;
    Ok(Json(
        service::daily_summary(db, request.start, request.end).await?,
    ))
}

/// GET /api/reports/receipt-profit?date=
pub async fn receipt_profit(
    query: Result<Query<ReceiptProfitRequest>, QueryRejection>,
) -> Result<Json<ReceiptProfitResponse>, ServiceError> {
    let Query(request) = query?;
    let db = get_connection()?;
    Ok(Json(service::receipt_profit_report(db, request.date).await?))
}

/// GET /api/reports/general
pub async fn general_stats() -> Result<Json<GeneralStats>, ServiceError> {
    let db = get_connection()?;
    Ok(Json(service::general_stats(db).await?))
}

/// GET /api/reports/work-order/:id
pub async fn work_order_detail(
    path: Result<Path<WorkOrderId>, PathRejection>,
) -> Result<Json<WorkOrderDetail>, ServiceError> {
    let Path(id) = path?;
    let db = get_connection()?;
    Ok(Json(service::work_order_detail(db, id).await?))
}
