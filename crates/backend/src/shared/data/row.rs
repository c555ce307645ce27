//! Column conversions between SQLite storage and domain values.

use chrono::{DateTime, Utc};
use contracts::domain::common::money;
use rust_decimal::Decimal;
use sea_orm::{DbErr, QueryResult};

use crate::shared::time;

/// Ids bound per `IN (...)` statement; SQLite caps bound variables per statement
pub const ID_CHUNK: usize = 500;

/// Amount stored as integer minor units
pub fn amount(row: &QueryResult, column: &str) -> Result<Decimal, DbErr> {
    let minor: i64 = row.try_get("", column)?;
    Ok(money::from_minor_units(minor))
}

/// Minor units of an amount that is about to be written
pub fn minor(value: Decimal) -> Result<i64, DbErr> {
    money::to_minor_units(value)
        .ok_or_else(|| DbErr::Custom(format!("amount {} cannot be stored exactly", value)))
}

pub fn timestamp(row: &QueryResult, column: &str) -> Result<DateTime<Utc>, DbErr> {
    let text: String = row.try_get("", column)?;
    time::from_db(&text)
}

pub fn opt_timestamp(row: &QueryResult, column: &str) -> Result<Option<DateTime<Utc>>, DbErr> {
    let text: Option<String> = row.try_get("", column)?;
    time::opt_from_db(text)
}

/// Total of the rows returned by `SELECT COUNT(*) AS cnt ...`
pub fn count(row: Option<QueryResult>) -> Result<i64, DbErr> {
    match row {
        Some(row) => row.try_get("", "cnt"),
        None => Ok(0),
    }
}
