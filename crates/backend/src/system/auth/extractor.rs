use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use contracts::system::auth::TokenClaims;

use crate::shared::activity_log::Actor;
use crate::shared::error::ServiceError;

/// Extractor for getting current user from JWT token
/// Usage in handlers: `async fn handler(CurrentUser(claims): CurrentUser) -> Response`
pub struct CurrentUser(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // claims are put into extensions by require_auth / require_admin
        parts
            .extensions
            .get::<TokenClaims>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ServiceError::Unauthorized)
    }
}

/// Client address: first `X-Forwarded-For` hop, else the socket peer
fn client_ip(parts: &Parts) -> Option<String> {
    let forwarded = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    forwarded.or_else(|| {
        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    })
}

/// Client address for routes without a token (login, register)
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip(parts)))
    }
}

/// Acting user and client IP for the activity log
#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(claims) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(Actor::new(&claims.sub, &claims.username, client_ip(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use contracts::system::users::UserRole;

    fn claims() -> TokenClaims {
        TokenClaims {
            sub: "u-7".into(),
            username: "usta".into(),
            role: UserRole::User,
            exp: 0,
            iat: 0,
        }
    }

    #[tokio::test]
    async fn actor_prefers_forwarded_address() {
        let (mut parts, _) = Request::builder()
            .header("x-forwarded-for", "10.0.0.5, 172.16.0.1")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(claims());
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));

        let actor = Actor::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(actor.user_id.as_deref(), Some("u-7"));
        assert_eq!(actor.ip_address.as_deref(), Some("10.0.0.5"));
    }

    #[tokio::test]
    async fn actor_falls_back_to_socket_and_requires_claims() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(matches!(
            Actor::from_request_parts(&mut parts, &()).await,
            Err(ServiceError::Unauthorized)
        ));

        parts.extensions.insert(claims());
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 9], 4000))));
        let actor = Actor::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(actor.ip_address.as_deref(), Some("192.168.1.9"));
    }

    #[tokio::test]
    async fn client_ip_needs_no_token() {
        let (mut parts, _) = Request::builder()
            .header("x-forwarded-for", " ")
            .body(())
            .unwrap()
            .into_parts();
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip, None);
    }
}
