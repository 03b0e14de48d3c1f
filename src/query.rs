// File: src/query.rs

use crate::record::Record;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// Column the kept records are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    TimeUtc,
    Status,
    RequestTime,
    BodyBytesSent,
    UpstreamResponseTime,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::TimeUtc => "time_utc",
            SortKey::Status => "status",
            SortKey::RequestTime => "request_time",
            SortKey::BodyBytesSent => "body_bytes_sent",
            SortKey::UpstreamResponseTime => "upstream_response_time",
        }
    }

    /// Ascending order of two records on this key. Absent values are lower
    /// than every present value.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortKey::TimeUtc => a.time_utc.cmp(&b.time_utc),
            SortKey::Status => a.status.cmp(&b.status),
            SortKey::BodyBytesSent => a.body_bytes_sent.cmp(&b.body_bytes_sent),
            SortKey::RequestTime => compare_float(a.request_time, b.request_time),
            SortKey::UpstreamResponseTime => {
                compare_float(a.upstream_response_time, b.upstream_response_time)
            }
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn compare_float(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filter, order and limit settings for one run. Built once before the
/// first line is read.
///
/// Every filter is optional; `None` means the category does not constrain
/// anything. Categories combine with AND, values inside one category with OR.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub status: Option<HashSet<i64>>,
    pub method: Option<HashSet<String>>,
    pub path_contains: Option<String>,
    pub ip: Option<HashSet<String>>,
    /// Inclusive lower bound on `time_utc`.
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `time_utc`.
    pub until: Option<DateTime<Utc>>,
    pub sort_by: SortKey,
    pub descending: bool,
    pub limit: Option<usize>,
    /// Abort the run on the first line that does not match the grammar.
    pub strict: bool,
}

impl Query {
    /// True if the record passes every configured filter.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(allowed) = &self.status {
            match record.status {
                Some(status) if allowed.contains(&status) => {}
                _ => return false,
            }
        }
        if let Some(allowed) = &self.method {
            if !allowed.contains(&record.method) {
                return false;
            }
        }
        if let Some(needle) = self.path_contains.as_deref().filter(|s| !s.is_empty()) {
            if !record.path.contains(needle) {
                return false;
            }
        }
        if let Some(allowed) = &self.ip {
            if !allowed.contains(&record.remote_addr) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if record.time_utc < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if record.time_utc > until {
                return false;
            }
        }
        true
    }

    /// Sorts the kept records, then truncates them to `limit`.
    pub fn finish(&self, mut records: Vec<Record>) -> Vec<Record> {
        sort_records(&mut records, self.sort_by, self.descending);
        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
        records
    }
}

/// Stable sort: records with equal keys keep their input order in both
/// directions.
pub fn sort_records(records: &mut [Record], key: SortKey, descending: bool) {
    if descending {
        records.sort_by(|a, b| key.compare(b, a));
    } else {
        records.sort_by(|a, b| key.compare(a, b));
    }
}
