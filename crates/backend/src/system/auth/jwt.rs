use anyhow::{Context, Result};
use chrono::Utc;
use contracts::system::auth::TokenClaims;
use contracts::system::users::UserRole;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::{config, time};

const JWT_SECRET_KEY: &str = "jwt_secret";

/// Issue an access token; lifetime comes from `[auth] access_token_hours`
pub async fn generate_access_token<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    username: &str,
    role: UserRole,
) -> Result<String> {
    let now = Utc::now();
    let lifetime = chrono::Duration::hours(config::current().auth.access_token_hours);
    let claims = TokenClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role,
        exp: (now + lifetime).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let secret = get_jwt_secret(db).await?;
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

/// Validate JWT token and extract claims
pub async fn validate_token<C: ConnectionTrait>(db: &C, token: &str) -> Result<TokenClaims> {
    let secret = get_jwt_secret(db).await?;
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;
    Ok(token_data.claims)
}

/// Secret stored in `sys_settings`, generated on first use
pub async fn get_jwt_secret<C: ConnectionTrait>(db: &C) -> Result<String> {
    if let Some(secret) = read_secret(db).await? {
        return Ok(secret);
    }

    // INSERT OR IGNORE: a concurrent first request keeps whichever secret won
    let now = time::to_db(time::now());
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT OR IGNORE INTO sys_settings (key, value, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
        [
            JWT_SECRET_KEY.into(),
            generate_jwt_secret().into(),
            "Auto-generated JWT secret for authentication".into(),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await?;

    read_secret(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("JWT secret could not be stored"))
}

/// 256 random bits, base64
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(random_bytes)
}

async fn read_secret<C: ConnectionTrait>(db: &C) -> Result<Option<String>> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            [JWT_SECRET_KEY.into()],
        ))
        .await?;
    match row {
        Some(row) => Ok(Some(row.try_get("", "value")?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    #[tokio::test]
    async fn issued_token_validates() {
        let db = test_connection().await;
        let token = generate_access_token(&db, "u-1", "usta", UserRole::Admin)
            .await
            .unwrap();
        let claims = validate_token(&db, &token).await.unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.username, "usta");
        assert!(claims.is_admin());
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn secret_is_generated_once() {
        let db = test_connection().await;
        let first = get_jwt_secret(&db).await.unwrap();
        let second = get_jwt_secret(&db).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 44);
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let db = test_connection().await;
        let token = generate_access_token(&db, "u-1", "usta", UserRole::User)
            .await
            .unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(validate_token(&db, &tampered).await.is_err());
        assert!(validate_token(&db, "garbage").await.is_err());
    }
}
