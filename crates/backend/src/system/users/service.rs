use contracts::system::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserInfo};
use contracts::system::users::{CreateUserDto, User, UserRole};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::activity_log::{self, ActivityEvent, Actor};
use crate::shared::error::{ServiceError, ServiceResult};
use crate::shared::{time, validation};
use crate::system::auth::{jwt, password};

const ENTITY: &str = "sys_users";

fn not_found(id: &str) -> ServiceError {
    ServiceError::not_found(ENTITY, id)
}

pub fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id.clone(),
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        role: user.role,
    }
}

/// Create a new user
pub async fn create(db: &DatabaseConnection, dto: CreateUserDto) -> ServiceResult<User> {
    let username = validation::required_text(&dto.username, "username")?;
    if repository::get_by_username(db, &username).await?.is_some() {
        return Err(ServiceError::validation("username", "is already taken"));
    }
    password::validate_password_strength(&dto.password)?;
    let password_hash = password::hash_password(&dto.password)?;

    let now = time::to_db(time::now());
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username,
        full_name: validation::optional_text(dto.full_name),
        role: dto.role,
        is_approved: dto.is_approved,
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
        last_login_at: None,
        approved_by: None,
    };
    repository::insert(db, &user, &password_hash).await?;

    tracing::info!(
        "Created user '{}' ({}, approved: {})",
        user.username,
        user.role.as_str(),
        user.is_approved
    );
    Ok(user)
}

/// Self-registration. The account cannot log in until an admin approves it.
pub async fn register(
    db: &DatabaseConnection,
    request: RegisterRequest,
    ip_address: Option<String>,
) -> ServiceResult<RegisterResponse> {
    let user = create(
        db,
        CreateUserDto {
            username: request.username,
            password: request.password,
            full_name: request.full_name,
            role: UserRole::User,
            is_approved: false,
        },
    )
    .await?;

    let actor = Actor {
        user_id: Some(user.id.clone()),
        username: Some(user.username.clone()),
        ip_address,
    };
    activity_log::record(
        db,
        ActivityEvent::new(&actor, "register", ENTITY).entity_id(&user.id),
    );
    Ok(RegisterResponse {
        id: user.id,
        is_approved: user.is_approved,
    })
}

/// Verify user credentials (for login).
///
/// Unknown user and wrong password both give `Unauthorized`; an account that is
/// not approved or not active gives `Forbidden`.
pub async fn verify_credentials(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> ServiceResult<User> {
    let user = repository::get_by_username(db, username.trim())
        .await?
        .ok_or(ServiceError::Unauthorized)?;

    let password_hash = repository::get_password_hash(db, &user.id)
        .await?
        .ok_or(ServiceError::Unauthorized)?;
    if !password::verify_password(password, &password_hash)? {
        return Err(ServiceError::Unauthorized);
    }

    if !user.is_approved {
        return Err(ServiceError::Forbidden(
            "account is waiting for administrator approval".to_string(),
        ));
    }
    if !user.is_active {
        return Err(ServiceError::Forbidden("account is inactive".to_string()));
    }

    if let Err(e) = repository::update_last_login(db, &user.id, &time::to_db(time::now())).await {
        tracing::warn!("Failed to update last login of '{}': {}", user.username, e);
    }
    Ok(user)
}

pub async fn login(
    db: &DatabaseConnection,
    request: LoginRequest,
    ip_address: Option<String>,
) -> ServiceResult<LoginResponse> {
    let user = verify_credentials(db, &request.username, &request.password).await?;
    let access_token = jwt::generate_access_token(db, &user.id, &user.username, user.role).await?;

    let actor = Actor::new(&user.id, &user.username, ip_address);
    activity_log::record(db, ActivityEvent::new(&actor, "login", ENTITY).entity_id(&user.id));

    Ok(LoginResponse {
        access_token,
        user: user_info(&user),
    })
}

pub async fn approve(db: &DatabaseConnection, id: &str, actor: &Actor) -> ServiceResult<User> {
    let now = time::to_db(time::now());
    if !repository::approve(db, id, actor.user_id.as_deref(), &now).await? {
        return Err(not_found(id));
    }
    let user = get(db, id).await?;

    tracing::info!("User '{}' approved", user.username);
    activity_log::record(
        db,
        ActivityEvent::new(actor, "approve", ENTITY)
            .entity_id(id)
            .details(user.username.clone()),
    );
    Ok(user)
}

/// Block further logins; existing tokens stay valid until they expire
pub async fn deactivate(db: &DatabaseConnection, id: &str, actor: &Actor) -> ServiceResult<User> {
    if actor.user_id.as_deref() == Some(id) {
        return Err(ServiceError::InvalidState(
            "you cannot deactivate your own account".to_string(),
        ));
    }
    let now = time::to_db(time::now());
    if !repository::set_active(db, id, false, &now).await? {
        return Err(not_found(id));
    }
    let user = get(db, id).await?;

    activity_log::record(
        db,
        ActivityEvent::new(actor, "deactivate", ENTITY)
            .entity_id(id)
            .details(user.username.clone()),
    );
    Ok(user)
}

pub async fn delete(db: &DatabaseConnection, id: &str, actor: &Actor) -> ServiceResult<()> {
    if actor.user_id.as_deref() == Some(id) {
        return Err(ServiceError::InvalidState(
            "you cannot delete your own account".to_string(),
        ));
    }
    let user = get(db, id).await?;
    repository::delete(db, id).await?;

    tracing::info!("User '{}' deleted", user.username);
    activity_log::record(
        db,
        ActivityEvent::new(actor, "delete", ENTITY)
            .entity_id(id)
            .details(user.username),
    );
    Ok(())
}

pub async fn get(db: &DatabaseConnection, id: &str) -> ServiceResult<User> {
    repository::get_by_id(db, id).await?.ok_or_else(|| not_found(id))
}

pub async fn list(db: &DatabaseConnection) -> ServiceResult<Vec<User>> {
    Ok(repository::list_all(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    fn admin() -> Actor {
        Actor::new("admin-id", "admin", None)
    }

    fn register_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: "parola123".to_string(),
            full_name: Some("Usta Ali".to_string()),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn registered_user_needs_approval() {
        let db = test_connection().await;
        let registered = register(&db, register_request("ali"), None).await.unwrap();
        assert!(!registered.is_approved);

        assert!(matches!(
            login(&db, login_request("ali", "parola123"), None).await,
            Err(ServiceError::Forbidden(_))
        ));

        let approved = approve(&db, &registered.id, &admin()).await.unwrap();
        assert!(approved.is_approved);
        assert_eq!(approved.approved_by.as_deref(), Some("admin-id"));

        let response = login(&db, login_request("ali", "parola123"), None).await.unwrap();
        assert_eq!(response.user.username, "ali");
        assert_eq!(response.user.role, UserRole::User);
        let claims = jwt::validate_token(&db, &response.access_token).await.unwrap();
        assert_eq!(claims.sub, registered.id);
        assert!(get(&db, &registered.id).await.unwrap().last_login_at.is_some());
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let db = test_connection().await;
        let registered = register(&db, register_request("veli"), None).await.unwrap();
        approve(&db, &registered.id, &admin()).await.unwrap();

        assert!(matches!(
            login(&db, login_request("veli", "yanlis"), None).await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            login(&db, login_request("nobody", "parola123"), None).await,
            Err(ServiceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let db = test_connection().await;
        register(&db, register_request("ali"), None).await.unwrap();
        match register(&db, register_request(" ali "), None).await {
            Err(ServiceError::ValidationFailed { field, .. }) => assert_eq!(field, "username"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn deactivated_user_cannot_log_in() {
        let db = test_connection().await;
        let registered = register(&db, register_request("can"), None).await.unwrap();
        approve(&db, &registered.id, &admin()).await.unwrap();
        deactivate(&db, &registered.id, &admin()).await.unwrap();
        assert!(matches!(
            login(&db, login_request("can", "parola123"), None).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_other_users_only() {
        let db = test_connection().await;
        let registered = register(&db, register_request("can"), None).await.unwrap();
        let me = Actor::new(&registered.id, "can", None);
        assert!(matches!(
            delete(&db, &registered.id, &me).await,
            Err(ServiceError::InvalidState(_))
        ));

        delete(&db, &registered.id, &admin()).await.unwrap();
        assert!(list(&db).await.unwrap().is_empty());
        assert!(matches!(
            approve(&db, &registered.id, &admin()).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
