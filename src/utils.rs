//! Utility functions for listing timestamps, log formatting, and output
//! directories.

use chrono::{DateTime, NaiveDateTime, Utc, Weekday};
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Layout of the post date shown in a listing row, e.g.
/// `Tue Oct 13 09:15:00 2026`. The day of month may be space-padded.
pub const POST_TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// [`POST_TIMESTAMP_FORMAT`] after its leading weekday.
const POST_DATE_FORMAT: &str = "%b %e %H:%M:%S %Y";

/// Parse a listing post date. The page carries no zone, so it is read as UTC.
///
/// Runs of whitespace are collapsed first, so `Fri Oct  2 ...` and
/// `Fri Oct 2 ...` parse the same. The weekday must be a three-letter day
/// name but is not checked against the date: `Mon Sep 20 ...` is Sep 20
/// whatever day that falls on.
///
/// # Returns
///
/// `None` when the text does not match [`POST_TIMESTAMP_FORMAT`].
pub fn parse_post_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let mut tokens = raw.split_whitespace();
    let weekday = tokens.next()?;
    if weekday.len() != 3 || weekday.parse::<Weekday>().is_err() {
        return None;
    }
    let rest = tokens.collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&rest, POST_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Render a timestamp the way listing pages show it.
pub fn format_post_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(POST_TIMESTAMP_FORMAT).to_string()
}

/// Whole days from `posted_at` to `now`: `floor(hours / 24)`.
///
/// Timestamps in the future give a negative age.
pub fn age_in_days(posted_at: &DateTime<Utc>, now: &DateTime<Utc>) -> i64 {
    (*now - *posted_at).num_hours().div_euclid(24)
}

/// Truncate a string for logging purposes.
///
/// Cuts on a character boundary at or below `max` bytes and appends
/// `"…(+N bytes)"`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_parse_post_timestamp_single_digit_day() {
        let ts = parse_post_timestamp("Fri Oct  2 07:05:09 2026").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 10, 2, 7, 5, 9).unwrap());
        assert_eq!(parse_post_timestamp("Fri Oct 2 07:05:09 2026"), Some(ts));
    }

    #[test]
    fn test_parse_post_timestamp_surrounding_whitespace() {
        let ts = parse_post_timestamp("\n   Tue Oct 13 09:15:00 2026  ").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 10, 13, 9, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_post_timestamp_rejects_garbage() {
        assert!(parse_post_timestamp("yesterday").is_none());
        assert!(parse_post_timestamp("").is_none());
        assert!(parse_post_timestamp("2026-10-13 09:15:00").is_none());
    }

    #[test]
    fn test_parse_post_timestamp_ignores_wrong_weekday() {
        // Sep 20 2026 is a Sunday.
        let ts = parse_post_timestamp("Mon Sep 20 10:00:00 2026").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 9, 20, 10, 0, 0).unwrap());
        assert_eq!(parse_post_timestamp("sun Sep 20 10:00:00 2026"), Some(ts));
    }

    #[test]
    fn test_parse_post_timestamp_requires_weekday_name() {
        assert!(parse_post_timestamp("Foo Sep 20 10:00:00 2026").is_none());
        assert!(parse_post_timestamp("Monday Sep 20 10:00:00 2026").is_none());
        assert!(parse_post_timestamp("Sep 20 10:00:00 2026").is_none());
    }

    #[test]
    fn test_post_timestamp_round_trip() {
        let start = Utc.with_ymd_and_hms(2024, 2, 27, 23, 59, 59).unwrap();
        for hours in (0..24 * 400).step_by(37) {
            let ts = start + Duration::hours(hours);
            assert_eq!(parse_post_timestamp(&format_post_timestamp(&ts)), Some(ts));
        }
    }

    #[test]
    fn test_age_in_days_floors() {
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();
        assert_eq!(age_in_days(&now, &now), 0);
        assert_eq!(age_in_days(&(now - Duration::hours(23)), &now), 0);
        assert_eq!(age_in_days(&(now - Duration::hours(24)), &now), 1);
        assert_eq!(age_in_days(&(now - Duration::days(14)), &now), 14);
        assert_eq!(age_in_days(&(now - Duration::days(15) + Duration::minutes(1)), &now), 14);
        assert_eq!(age_in_days(&(now + Duration::hours(1)), &now), -1);
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.ends_with("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        let result = truncate_for_log("ééé", 3);
        assert_eq!(result, "é…(+4 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let dir = std::env::temp_dir()
            .join(format!("offer_feed_utils_{}", std::process::id()))
            .join("nested");
        ensure_writable_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
        std::fs::remove_dir_all(dir.parent().unwrap()).ok();
    }
}
