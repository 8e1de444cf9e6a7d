//! Time bucketing utilities for ledger aggregation
//!
//! - Day buckets: "YYYY-MM-DD", used for streaks
//! - Month buckets: "YYYY-MM", used for monthly points and monthly ranking

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Compute the day bucket string from a Unix timestamp in milliseconds.
///
/// # Example
/// ```
/// use palco::ledger::day_bucket;
/// assert_eq!(day_bucket(1703721600000), "2023-12-28");
/// ```
pub fn day_bucket(timestamp_ms: i64) -> String {
    let dt = DateTime::from_timestamp_millis(timestamp_ms).unwrap_or_else(Utc::now);
    format!("{:04}-{:02}-{:02}", dt.year(), dt.month(), dt.day())
}

/// Compute the calendar month bucket ("YYYY-MM", UTC) from a timestamp in milliseconds.
///
/// # Example
/// ```
/// use palco::ledger::month_bucket;
/// assert_eq!(month_bucket(1703721600000), "2023-12");
/// ```
pub fn month_bucket(timestamp_ms: i64) -> String {
    let dt = DateTime::from_timestamp_millis(timestamp_ms).unwrap_or_else(Utc::now);
    format!("{:04}-{:02}", dt.year(), dt.month())
}

pub fn current_month_bucket() -> String {
    month_bucket(now_ms())
}

/// Current time in ms since epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a day bucket back into a date
pub fn parse_day_bucket(bucket: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(bucket, "%Y-%m-%d").ok()
}

/// The UTC date a timestamp falls on
pub fn date_of(timestamp_ms: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(timestamp_ms)
        .unwrap_or_else(Utc::now)
        .date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_month_bucket_edges() {
        assert_eq!(month_bucket(ts(2024, 1, 31, 23)), "2024-01");
        assert_eq!(month_bucket(ts(2024, 2, 1, 0)), "2024-02");
    }

    #[test]
    fn test_day_bucket_roundtrip() {
        let bucket = day_bucket(ts(2024, 2, 29, 12));
        assert_eq!(bucket, "2024-02-29");
        assert_eq!(
            parse_day_bucket(&bucket),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_day_bucket("2024-13-01"), None);
    }
}
