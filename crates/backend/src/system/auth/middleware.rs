use axum::{extract::Request, http::header, middleware::Next, response::Response};
use contracts::system::auth::TokenClaims;

use crate::shared::data::db::get_connection;
use crate::shared::error::ServiceError;

/// Token from `Authorization: Bearer <token>`
fn bearer(req: &Request) -> Result<String, ServiceError> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(ServiceError::Unauthorized)
}

async fn claims_from(token: String) -> Result<TokenClaims, ServiceError> {
    let db = get_connection()?;
    super::jwt::validate_token(db, &token).await.map_err(|e| {
        tracing::debug!("Rejected access token: {}", e);
        ServiceError::Unauthorized
    })
}

/// Middleware that requires valid JWT authentication
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, ServiceError> {
    let token = bearer(&req)?;
    let claims = claims_from(token).await?;
    // handlers read the claims through CurrentUser / Actor
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Middleware that requires admin privileges
pub async fn require_admin(mut req: Request, next: Next) -> Result<Response, ServiceError> {
    let token = bearer(&req)?;
    let claims = claims_from(token).await?;
    if !claims.is_admin() {
        return Err(ServiceError::Forbidden("admin role required".to_string()));
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
