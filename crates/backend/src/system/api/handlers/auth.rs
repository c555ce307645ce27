use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use contracts::system::auth::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserInfo,
};

use crate::shared::data::db::get_connection;
use crate::shared::error::ServiceError;
use crate::system::auth::extractor::{ClientIp, CurrentUser};
use crate::system::users::service;

/// POST /api/system/auth/login
pub async fn login(
    ClientIp(ip): ClientIp,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let Json(request) = payload?;
    let db = get_connection()?;
    let response = service::login(db, request, ip).await?;
    Ok(Json(response))
}

/// POST /api/system/auth/register
pub async fn register(
    ClientIp(ip): ClientIp,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ServiceError> {
    let Json(request) = payload?;
    let db = get_connection()?;
    let response = service::register(db, request, ip).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/system/auth/me
pub async fn current_user(
    CurrentUser(claims): CurrentUser,
) -> Result<Json<UserInfo>, ServiceError> {
    let db = get_connection()?;
    let user = service::get(db, &claims.sub).await?;
    Ok(Json(service::user_info(&user)))
}
