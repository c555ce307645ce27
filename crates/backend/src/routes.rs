use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::api::handlers;
use crate::system;
use crate::system::auth::middleware::{require_admin, require_auth};

/// Business routes; a valid token is required
fn business_routes() -> Router {
    Router::new()
        // ========================================
        // A001 WORK ORDERS
        // ========================================
        .route(
            "/api/work-orders",
            get(handlers::a001_work_order::list).post(handlers::a001_work_order::create),
        )
        .route(
            "/api/work-orders/next-receipt-number/preview",
            get(handlers::a001_work_order::next_receipt_number),
        )
        .route(
            "/api/work-orders/:id",
            get(handlers::a001_work_order::get_by_id)
                .put(handlers::a001_work_order::update)
                .delete(handlers::a001_work_order::delete),
        )
        .route(
            "/api/work-orders/:id/complete",
            patch(handlers::a001_work_order::complete),
        )
        .route(
            "/api/work-orders/:id/line-items",
            post(handlers::a001_work_order::add_line_item),
        )
        .route(
            "/api/work-orders/:id/line-items/:line_item_id",
            delete(handlers::a001_work_order::remove_line_item),
        )
        // ========================================
        // A002 ACCESSORY SALES
        // ========================================
        .route(
            "/api/accessory-sales",
            get(handlers::a002_accessory_sale::list).post(handlers::a002_accessory_sale::create),
        )
        .route(
            "/api/accessory-sales/:id",
            get(handlers::a002_accessory_sale::get_by_id)
                .put(handlers::a002_accessory_sale::update)
                .delete(handlers::a002_accessory_sale::delete),
        )
        .route(
            "/api/accessory-sales/:id/complete",
            patch(handlers::a002_accessory_sale::complete),
        )
        .route(
            "/api/accessory-sales/:id/line-items",
            post(handlers::a002_accessory_sale::add_line_item),
        )
        .route(
            "/api/accessory-sales/:id/line-items/:line_item_id",
            delete(handlers::a002_accessory_sale::remove_line_item),
        )
        // ========================================
        // A003 EXPENSES / A004 CUSTOMERS
        // ========================================
        .route(
            "/api/expenses",
            get(handlers::a003_expense::list).post(handlers::a003_expense::create),
        )
        .route(
            "/api/expenses/:id",
            get(handlers::a003_expense::get_by_id)
                .put(handlers::a003_expense::update)
                .delete(handlers::a003_expense::delete),
        )
        .route(
            "/api/customers",
            get(handlers::a004_customer::list).post(handlers::a004_customer::create),
        )
        .route(
            "/api/customers/:id",
            get(handlers::a004_customer::get_by_id)
                .put(handlers::a004_customer::update)
                .delete(handlers::a004_customer::delete),
        )
        // ========================================
        // D400 REPORTS
        // ========================================
        .route(
            "/api/reports/daily",
            get(handlers::d400_financial_reports::daily_summary),
        )
        .route(
            "/api/reports/receipt-profit",
            get(handlers::d400_financial_reports::receipt_profit),
        )
        .route(
            "/api/reports/general",
            get(handlers::d400_financial_reports::general_stats),
        )
        .route(
            "/api/reports/work-order/:id",
            get(handlers::d400_financial_reports::work_order_detail),
        )
        // Print layouts
        .route(
            "/api/print-layouts/:key",
            get(handlers::print_layouts::get).put(handlers::print_layouts::save),
        )
        .route_layer(middleware::from_fn(require_auth))
}

/// All application routes
pub fn configure_routes() -> Router {
    Router::new()
        .merge(system::api::routes::configure_system_routes())
        .merge(business_routes())
        // Activity log (admin only)
        .route(
            "/api/activity-log",
            get(handlers::activity_log::list).layer(middleware::from_fn(require_admin)),
        )
}
