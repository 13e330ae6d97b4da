//! Time helpers
//!
//! Schedules are expressed in local wall-clock terms (dates, weekdays, time
//! of day) and are checked against a naive local [`Moment`]. Grace periods
//! are measured on the UTC time line with [`Timestamp`], which never jumps
//! when the local offset changes.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// A moment in local wall-clock time
pub type Moment = NaiveDateTime;

/// An instant on the UTC time line, used to time the unlock-shortly state
pub type Timestamp = DateTime<Utc>;

/// Format accepted by [`parse_moment`]
pub const MOMENT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local wall-clock time
pub fn now() -> Moment {
    Local::now().naive_local()
}

/// Current instant on the UTC time line
pub fn timestamp_now() -> Timestamp {
    Utc::now()
}

/// Parse a `YYYY-MM-DD HH:MM:SS` string
pub fn parse_moment(s: &str) -> Result<Moment, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), MOMENT_FORMAT)
}

/// Whole seconds elapsed from `since` to `now`, truncated toward zero
pub fn elapsed_whole_seconds(since: Timestamp, now: Timestamp) -> i64 {
    (now - since).num_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};

    #[test]
    fn test_parse_moment() {
        let moment = parse_moment("2025-10-06 10:00:00").unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap().and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(moment, expected);

        assert!(parse_moment("2025-10-06T10:00").is_err());
    }

    #[test]
    fn test_elapsed_whole_seconds_truncates() {
        let start = Utc.with_ymd_and_hms(2025, 10, 6, 8, 0, 0).unwrap();
        assert_eq!(elapsed_whole_seconds(start, start + Duration::milliseconds(9_999)), 9);
        assert_eq!(elapsed_whole_seconds(start, start + Duration::seconds(10)), 10);
        assert_eq!(elapsed_whole_seconds(start, start - Duration::seconds(3)), -3);
    }

    #[test]
    fn test_elapsed_ignores_local_offset_change() {
        // 2025-10-26 in Central Europe: 03:00 CEST falls back to 02:00 CET
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        let cet = FixedOffset::east_opt(3600).unwrap();
        let before = cest.with_ymd_and_hms(2025, 10, 26, 2, 59, 55).unwrap();
        let after = cet.with_ymd_and_hms(2025, 10, 26, 2, 0, 5).unwrap();

        assert!(after.naive_local() < before.naive_local());
        let elapsed = elapsed_whole_seconds(before.with_timezone(&Utc), after.with_timezone(&Utc));
        assert_eq!(elapsed, 10);
    }

    #[test]
    fn test_now_is_monotone_enough() {
        let before = timestamp_now();
        let after = timestamp_now();
        assert!(after >= before);
    }
}
