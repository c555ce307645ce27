use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use super::schema;
use crate::shared::config::{self, Config};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Open the SQLite file named by the configuration, create missing tables and
/// keep the connection for the handlers.
pub async fn initialize_database(config: &Config) -> anyhow::Result<()> {
    let db_file = config::get_database_path(config)?;
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    tracing::info!("Opening database: {}", db_url);

    let mut options = ConnectOptions::new(db_url);
    options.sqlx_logging(false);
    let conn = Database::connect(options).await?;

    schema::bootstrap(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> anyhow::Result<&'static DatabaseConnection> {
    DB_CONN
        .get()
        .ok_or_else(|| anyhow::anyhow!("Database connection has not been initialized"))
}

/// Fresh in-memory database with the full schema.
///
/// One pooled connection only: every connection to `sqlite::memory:` opens its
/// own empty database.
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("in-memory database");
    schema::bootstrap(&conn).await.expect("schema bootstrap");
    conn
}

/// File-backed database with a connection pool, for tests that write from
/// several connections at once. The caller removes the file.
#[cfg(test)]
pub async fn test_file_connection(path: &std::path::Path) -> DatabaseConnection {
    let url = format!("sqlite://{}?mode=rwc", path.to_string_lossy().replace('\\', "/"));
    let mut options = ConnectOptions::new(url);
    options.max_connections(8).sqlx_logging(false);
    let conn = Database::connect(options).await.expect("file database");
    schema::bootstrap(&conn).await.expect("schema bootstrap");
    conn
}
