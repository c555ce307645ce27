//! Versioned store for receipt print layouts. Documents are stored as given.

use chrono::Utc;
use contracts::shared::print_layout::PrintLayout;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::error::{ServiceError, ServiceResult};
use crate::shared::time;

const MAX_KEY_LEN: usize = 64;

fn check_key(layout_key: &str) -> ServiceResult<()> {
    if layout_key.trim().is_empty() || layout_key.len() > MAX_KEY_LEN {
        return Err(ServiceError::validation(
            "layout_key",
            format!("must be 1 to {} characters", MAX_KEY_LEN),
        ));
    }
    Ok(())
}

pub async fn get<C: ConnectionTrait>(db: &C, layout_key: &str) -> ServiceResult<PrintLayout> {
    check_key(layout_key)?;

    let row = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            r#"
            SELECT layout_key, document_json, version, updated_at
            FROM sys_print_layouts
            WHERE layout_key = ?
            "#,
            [layout_key.into()],
        ))
        .await?
        .ok_or_else(|| ServiceError::not_found("sys_print_layouts", layout_key))?;

    let document_json: String = row.try_get("", "document_json")?;
    let document = serde_json::from_str(&document_json)
        .map_err(|e| anyhow::anyhow!("stored layout '{}' is not JSON: {}", layout_key, e))?;

    Ok(PrintLayout {
        layout_key: row.try_get("", "layout_key")?,
        document,
        version: row.try_get("", "version")?,
        updated_at: row.try_get("", "updated_at")?,
    })
}

/// Insert or replace the document; the version starts at 1 and grows on every save
pub async fn save<C: ConnectionTrait>(
    db: &C,
    layout_key: &str,
    document: &serde_json::Value,
) -> ServiceResult<PrintLayout> {
    check_key(layout_key)?;
    let document_json = serde_json::to_string(document)
        .map_err(|e| ServiceError::validation("document", e.to_string()))?;

    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        r#"
        INSERT INTO sys_print_layouts (layout_key, document_json, version, updated_at)
        VALUES (?, ?, 1, ?)
        ON CONFLICT(layout_key) DO UPDATE SET
            document_json = excluded.document_json,
            version = sys_print_layouts.version + 1,
            updated_at = excluded.updated_at
        "#,
        [
            layout_key.into(),
            document_json.into(),
            time::to_db(Utc::now()).into(),
        ],
    ))
    .await?;

    get(db, layout_key).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;
    use serde_json::json;

    #[tokio::test]
    async fn save_bumps_version_and_keeps_document_opaque() {
        let db = test_connection().await;
        let first = json!({"fields": [{"key": "fis_no", "x": 10, "y": 20}]});
        let saved = save(&db, "receipt", &first).await.unwrap();
        assert_eq!(saved.version, 1);
        assert_eq!(saved.document, first);

        let second = json!({"anything": true});
        let saved = save(&db, "receipt", &second).await.unwrap();
        assert_eq!(saved.version, 2);
        assert_eq!(get(&db, "receipt").await.unwrap().document, second);
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let db = test_connection().await;
        assert!(matches!(
            get(&db, "missing").await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            save(&db, " ", &json!({})).await,
            Err(ServiceError::ValidationFailed { .. })
        ));
    }
}
