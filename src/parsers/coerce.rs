// File: src/parsers/coerce.rs

use crate::record::UpstreamStatus;
use std::str::FromStr;

/// Lenient numeric coercion. `-`, the empty string and anything that does
/// not parse as `T` all come back as absent; this never fails the line.
pub fn lenient<T: FromStr>(raw: &str) -> Option<T> {
    match raw {
        "" | "-" => None,
        _ => raw.parse::<T>().ok(),
    }
}

pub fn lenient_int(raw: &str) -> Option<i64> {
    lenient(raw)
}

pub fn lenient_float(raw: &str) -> Option<f64> {
    lenient(raw)
}

/// An all-digit token becomes a code; anything else (`-`, `"200, 502"`,
/// `502 : 200`) is kept as written.
pub fn upstream_status(raw: &str) -> UpstreamStatus {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(code) = raw.parse::<u64>() {
            return UpstreamStatus::Code(code);
        }
    }
    UpstreamStatus::Raw(raw.to_string())
}
