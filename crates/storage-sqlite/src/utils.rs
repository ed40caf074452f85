//! Helpers shared by the repositories.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use log::warn;

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite limits bound parameters per statement (SQLITE_MAX_VARIABLE_NUMBER,
/// typically 999). Lists passed to `IN (...)` are split into chunks this size.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Timestamps are stored as RFC 3339 UTC with fixed microsecond precision so
/// that string order is chronological order.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!("Invalid stored timestamp '{}': {}", value, e);
            DateTime::<Utc>::UNIX_EPOCH
        })
}

pub fn parse_optional_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value.as_deref().map(parse_timestamp)
}

pub fn format_date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_chunk_for_sqlite_over_limit() {
        let items: Vec<i32> = (0..1200).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 200);
    }

    #[test]
    fn test_timestamp_strings_sort_chronologically() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 59, 59).unwrap();
        let later = base + Duration::microseconds(1);
        let much_later = base + Duration::seconds(1);

        let a = format_timestamp(base);
        let b = format_timestamp(later);
        let c = format_timestamp(much_later);
        assert!(a < b && b < c);
        assert_eq!(a, "2024-03-01T09:59:59.000000Z");
        assert_eq!(parse_timestamp(&b), later);
    }

    #[test]
    fn test_invalid_timestamp_falls_back_to_epoch() {
        assert_eq!(parse_timestamp("yesterday"), DateTime::<Utc>::UNIX_EPOCH);
    }
}
