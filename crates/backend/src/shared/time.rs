//! Instants are stored as UTC text; calendar days are cut in the display offset.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, SubsecRound, TimeZone, Utc,
};
use sea_orm::DbErr;

use crate::shared::config;

/// Offset used for local calendar days
pub fn display_offset() -> FixedOffset {
    config::current().display.offset()
}

/// Current instant at storage precision (microseconds), so values read back compare equal
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 text, sortable as a string
pub fn to_db(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn from_db(value: &str) -> Result<DateTime<Utc>, DbErr> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbErr::Type(format!("invalid timestamp '{}': {}", value, e)))
}

pub fn opt_from_db(value: Option<String>) -> Result<Option<DateTime<Utc>>, DbErr> {
    value.as_deref().map(from_db).transpose()
}

pub fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn date_from_db(value: &str) -> Result<NaiveDate, DbErr> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| DbErr::Type(format!("invalid date '{}': {}", value, e)))
}

/// Local calendar day of an instant
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

pub fn today(offset: FixedOffset) -> NaiveDate {
    local_date(Utc::now(), offset)
}

/// UTC instant of local midnight starting `date`
pub fn day_start_utc(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = date.and_time(NaiveTime::default());
    Utc.from_utc_datetime(&(local_midnight - chrono::Duration::seconds(offset.local_minus_utc() as i64)))
}

/// Half-open UTC range `[start 00:00, end+1 00:00)` covering local days `start..=end`
pub fn local_days_utc(
    start: NaiveDate,
    end: NaiveDate,
    offset: FixedOffset,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let after_end = end.succ_opt().unwrap_or(NaiveDate::MAX);
    (day_start_utc(start, offset), day_start_utc(after_end, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn istanbul() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    #[test]
    fn day_bounds_follow_the_offset() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let (from, to) = local_days_utc(day, day, istanbul());
        assert_eq!(to_db(from), "2024-03-14T21:00:00.000000Z");
        assert_eq!(to_db(to), "2024-03-15T21:00:00.000000Z");
    }

    #[test]
    fn late_evening_utc_is_next_local_day() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 21, 30, 0).unwrap();
        assert_eq!(
            local_date(instant, istanbul()),
            NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
        );
    }

    #[test]
    fn now_survives_storage() {
        let instant = now();
        assert_eq!(from_db(&to_db(instant)).unwrap(), instant);
    }

    #[test]
    fn db_text_round_trips_and_sorts() {
        let a = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let b = a + chrono::Duration::milliseconds(1);
        assert_eq!(from_db(&to_db(a)).unwrap(), a);
        assert!(to_db(a) < to_db(b));
        assert!(from_db("yesterday").is_err());
    }
}
