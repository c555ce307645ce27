use contracts::system::users::{User, UserRole};
use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, QueryResult, Statement};

use crate::shared::data::row;

const SELECT_USER: &str = r#"
    SELECT id, username, full_name, role, is_approved, is_active,
           created_at, updated_at, last_login_at, approved_by
    FROM sys_users
"#;

fn user_from_row(row: &QueryResult) -> Result<User, DbErr> {
    let role: String = row.try_get("", "role")?;
    Ok(User {
        id: row.try_get("", "id")?,
        username: row.try_get("", "username")?,
        full_name: row.try_get("", "full_name")?,
        role: UserRole::parse(&role),
        is_approved: row.try_get::<i32>("", "is_approved")? != 0,
        is_active: row.try_get::<i32>("", "is_active")? != 0,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        last_login_at: row.try_get("", "last_login_at")?,
        approved_by: row.try_get("", "approved_by")?,
    })
}

/// Create user with password hash
pub async fn insert<C: ConnectionTrait>(conn: &C, user: &User, password_hash: &str) -> Result<(), DbErr> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_users (id, username, password_hash, full_name, role, is_approved, is_active, created_at, updated_at, last_login_at, approved_by)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        [
            user.id.clone().into(),
            user.username.clone().into(),
            password_hash.to_string().into(),
            user.full_name.clone().into(),
            user.role.as_str().into(),
            i32::from(user.is_approved).into(),
            i32::from(user.is_active).into(),
            user.created_at.clone().into(),
            user.updated_at.clone().into(),
            user.last_login_at.clone().into(),
            user.approved_by.clone().into(),
        ],
    ))
    .await?;
    Ok(())
}

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: &str) -> Result<Option<User>, DbErr> {
    conn.query_one(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        format!("{} WHERE id = ?", SELECT_USER),
        [id.into()],
    ))
    .await?
    .as_ref()
    .map(user_from_row)
    .transpose()
}

pub async fn get_by_username<C: ConnectionTrait>(conn: &C, username: &str) -> Result<Option<User>, DbErr> {
    conn.query_one(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        format!("{} WHERE username = ?", SELECT_USER),
        [username.into()],
    ))
    .await?
    .as_ref()
    .map(user_from_row)
    .transpose()
}

pub async fn get_password_hash<C: ConnectionTrait>(conn: &C, user_id: &str) -> Result<Option<String>, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT password_hash FROM sys_users WHERE id = ?",
            [user_id.into()],
        ))
        .await?;
    match row {
        Some(row) => Ok(Some(row.try_get("", "password_hash")?)),
        None => Ok(None),
    }
}

/// List all users, newest first
pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<User>, DbErr> {
    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("{} ORDER BY created_at DESC, username", SELECT_USER),
        ))
        .await?;
    rows.iter().map(user_from_row).collect()
}

pub async fn approve<C: ConnectionTrait>(
    conn: &C,
    id: &str,
    approved_by: Option<&str>,
    now: &str,
) -> Result<bool, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE sys_users SET is_approved = 1, approved_by = ?, updated_at = ? WHERE id = ?",
            [approved_by.map(str::to_string).into(), now.into(), id.into()],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_active<C: ConnectionTrait>(conn: &C, id: &str, active: bool, now: &str) -> Result<bool, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE sys_users SET is_active = ?, updated_at = ? WHERE id = ?",
            [i32::from(active).into(), now.into(), id.into()],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_last_login<C: ConnectionTrait>(conn: &C, id: &str, now: &str) -> Result<(), DbErr> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE sys_users SET last_login_at = ? WHERE id = ?",
        [now.into(), id.into()],
    ))
    .await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(conn: &C, id: &str) -> Result<bool, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM sys_users WHERE id = ?",
            [id.into()],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_users<C: ConnectionTrait>(conn: &C) -> Result<i64, DbErr> {
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) AS cnt FROM sys_users".to_string(),
        ))
        .await?;
    row::count(row)
}
