//! Store-level counters (`sys_sequences`).
//!
//! Values are handed out by the database inside the caller's transaction, so
//! concurrent writers never observe the same number and a rolled back creation
//! gives its number back.

use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};

/// Work-order receipt numbers
pub const RECEIPT_NUMBER: &str = "fis_no";

/// Take the next value of a sequence. Call it on a transaction.
pub async fn allocate<C: ConnectionTrait>(conn: &C, name: &str) -> Result<i64, DbErr> {
    let result = conn
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE sys_sequences SET next_value = next_value + 1 WHERE name = ?",
            [name.into()],
        ))
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbErr::RecordNotFound(format!("sequence '{}'", name)));
    }

    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT next_value - 1 AS value FROM sys_sequences WHERE name = ?",
            [name.into()],
        ))
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("sequence '{}'", name)))?;
    row.try_get("", "value")
}

/// Value the next `allocate` would return; nothing is consumed
pub async fn peek<C: ConnectionTrait>(conn: &C, name: &str) -> Result<i64, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT next_value FROM sys_sequences WHERE name = ?",
            [name.into()],
        ))
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("sequence '{}'", name)))?;
    row.try_get("", "next_value")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;
    use sea_orm::TransactionTrait;

    #[tokio::test]
    async fn peek_does_not_consume() {
        let conn = test_connection().await;
        assert_eq!(peek(&conn, RECEIPT_NUMBER).await.unwrap(), 1);
        assert_eq!(peek(&conn, RECEIPT_NUMBER).await.unwrap(), 1);
        assert_eq!(allocate(&conn, RECEIPT_NUMBER).await.unwrap(), 1);
        assert_eq!(peek(&conn, RECEIPT_NUMBER).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn rolled_back_allocation_is_returned() {
        let conn = test_connection().await;
        let txn = conn.begin().await.unwrap();
        assert_eq!(allocate(&txn, RECEIPT_NUMBER).await.unwrap(), 1);
        txn.rollback().await.unwrap();

        assert_eq!(allocate(&conn, RECEIPT_NUMBER).await.unwrap(), 1);
        assert_eq!(allocate(&conn, RECEIPT_NUMBER).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn unknown_sequence_is_an_error() {
        let conn = test_connection().await;
        assert!(allocate(&conn, "missing").await.is_err());
        assert!(peek(&conn, "missing").await.is_err());
    }
}
