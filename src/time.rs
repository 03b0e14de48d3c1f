// File: src/time.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use humantime::parse_duration;

/// Layout of nginx `$time_local`, e.g. `26/Apr/2021:21:20:17 +0000`.
pub const TIME_LOCAL_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses `$time_local` and converts it to UTC using the embedded offset.
///
/// Unlike the numeric fields this is never lenient: the caller decides what
/// a failure means for the line.
pub fn parse_time_local(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_str(raw, TIME_LOCAL_FORMAT).map(|dt| dt.with_timezone(&Utc))
}

/// Parses a user-provided time bound (`--since` / `--until`).
///
/// Accepts `now`, relative durations ("15m", "2h ago") and ISO 8601
/// timestamps. A trailing `Z` means UTC; timestamps without an offset are
/// taken as UTC too.
pub fn parse_time_bound(time_str: &str) -> Result<DateTime<Utc>, String> {
    let time_str = time_str.trim();
    if time_str.eq_ignore_ascii_case("now") {
        return Ok(Utc::now());
    }

    let clean_str = time_str.strip_suffix(" ago").unwrap_or(time_str);
    if let Ok(duration) = parse_duration(clean_str) {
        return TimeDelta::from_std(duration)
            .ok()
            .and_then(|delta| Utc::now().checked_sub_signed(delta))
            .ok_or_else(|| format!("Time string is too far in the past: {}", time_str));
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(time_str) {
        return Ok(datetime.with_timezone(&Utc));
    }

    let naive_str = time_str
        .strip_suffix(|c: char| c == 'Z' || c == 'z')
        .unwrap_or(time_str);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_str, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(naive_str, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(format!("Could not parse time string: {}", time_str))
}
