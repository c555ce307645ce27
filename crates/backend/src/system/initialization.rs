use anyhow::Result;
use contracts::system::users::{CreateUserDto, UserRole};
use sea_orm::DatabaseConnection;

use crate::system::users::{repository, service};

/// Ensure admin user exists (create if table is empty)
pub async fn ensure_admin_user_exists(db: &DatabaseConnection) -> Result<()> {
    let count = repository::count_users(db).await?;
    if count > 0 {
        return Ok(());
    }

    tracing::info!("No users found. Creating default admin user...");
    let admin = service::create(
        db,
        CreateUserDto {
            username: "admin".to_string(),
            password: "admin".to_string(),
            full_name: Some("Administrator".to_string()),
            role: UserRole::Admin,
            is_approved: true,
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create default admin: {}", e))?;

    tracing::warn!("═══════════════════════════════════════════════");
    tracing::warn!("  Default admin user created!");
    tracing::warn!("  Username: admin");
    tracing::warn!("  Password: admin");
    tracing::warn!("  User ID: {}", admin.id);
    tracing::warn!("  ⚠️  PLEASE CHANGE THE PASSWORD IMMEDIATELY!");
    tracing::warn!("═══════════════════════════════════════════════");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    #[tokio::test]
    async fn admin_is_created_once() {
        let db = test_connection().await;
        ensure_admin_user_exists(&db).await.unwrap();
        ensure_admin_user_exists(&db).await.unwrap();

        let users = service::list(&db).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, UserRole::Admin);
        assert!(users[0].is_approved);
        assert!(service::verify_credentials(&db, "admin", "admin").await.is_ok());
    }
}
