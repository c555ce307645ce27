use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use super::handlers;
use crate::system::auth;

/// System routes: auth and user administration
pub fn configure_system_routes() -> Router {
    Router::new()
        // ========================================
        // HEALTH CHECK
        // ========================================
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM AUTH ROUTES (PUBLIC)
        // ========================================
        .route("/api/system/auth/login", post(handlers::auth::login))
        .route("/api/system/auth/register", post(handlers::auth::register))
        // System auth routes (protected)
        .route(
            "/api/system/auth/me",
            get(handlers::auth::current_user)
                .layer(middleware::from_fn(auth::middleware::require_auth)),
        )
        // ========================================
        // SYSTEM USERS MANAGEMENT (admin only)
        // ========================================
        .route(
            "/api/system/users",
            get(handlers::users::list)
                .layer(middleware::from_fn(auth::middleware::require_admin)),
        )
        .route(
            "/api/system/users/:id",
            delete(handlers::users::delete)
                .layer(middleware::from_fn(auth::middleware::require_admin)),
        )
        .route(
            "/api/system/users/:id/approve",
            post(handlers::users::approve)
                .layer(middleware::from_fn(auth::middleware::require_admin)),
        )
        .route(
            "/api/system/users/:id/deactivate",
            post(handlers::users::deactivate)
                .layer(middleware::from_fn(auth::middleware::require_admin)),
        )
}
