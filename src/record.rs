// File: src/record.rs

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Output column order. Shared by the CSV header and the JSON key order.
pub const COLUMNS: [&str; 21] = [
    "remote_addr",
    "time_local",
    "time_utc",
    "method",
    "uri",
    "path",
    "proto",
    "status",
    "body_bytes_sent",
    "http_referer",
    "http_user_agent",
    "request_length",
    "request_time",
    "upstream_name",
    "upstream_alternative",
    "upstream_addr",
    "upstream_response_length",
    "upstream_response_time",
    "upstream_status",
    "request_id",
    "query_keys_count",
];

/// What the upstream reported as its status.
///
/// A single upstream yields a plain code, but retried or split requests
/// report a chain such as `"200, 502"` (or `-` when no upstream answered),
/// which is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UpstreamStatus {
    Code(u64),
    Raw(String),
}

impl fmt::Display for UpstreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UpstreamStatus::Code(code) => write!(f, "{}", code),
            UpstreamStatus::Raw(token) => f.write_str(token),
        }
    }
}

/// One fully parsed access-log line.
///
/// Built once by [`crate::parsers::parse_access_line`] and never modified
/// afterwards. The source line is not retained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub remote_addr: String,
    pub time_local: String,
    #[serde(serialize_with = "serialize_utc")]
    pub time_utc: DateTime<Utc>,
    pub method: String,
    pub uri: String,
    pub path: String,
    pub proto: String,
    pub status: Option<i64>,
    pub body_bytes_sent: Option<i64>,
    pub http_referer: String,
    pub http_user_agent: String,
    pub request_length: Option<i64>,
    pub request_time: Option<f64>,
    pub upstream_name: String,
    pub upstream_alternative: String,
    pub upstream_addr: String,
    pub upstream_response_length: Option<i64>,
    pub upstream_response_time: Option<f64>,
    pub upstream_status: UpstreamStatus,
    pub request_id: String,
    pub query_keys_count: usize,
}

impl Record {
    /// `time_utc` in its canonical `2021-04-26T21:20:17Z` form.
    pub fn time_utc_string(&self) -> String {
        format_utc(&self.time_utc)
    }

    /// The record as text cells, in [`COLUMNS`] order. Absent values are empty.
    pub fn cells(&self) -> [Cow<'_, str>; 21] {
        [
            Cow::Borrowed(self.remote_addr.as_str()),
            Cow::Borrowed(self.time_local.as_str()),
            Cow::Owned(self.time_utc_string()),
            Cow::Borrowed(self.method.as_str()),
            Cow::Borrowed(self.uri.as_str()),
            Cow::Borrowed(self.path.as_str()),
            Cow::Borrowed(self.proto.as_str()),
            int_cell(self.status),
            int_cell(self.body_bytes_sent),
            Cow::Borrowed(self.http_referer.as_str()),
            Cow::Borrowed(self.http_user_agent.as_str()),
            int_cell(self.request_length),
            float_cell(self.request_time),
            Cow::Borrowed(self.upstream_name.as_str()),
            Cow::Borrowed(self.upstream_alternative.as_str()),
            Cow::Borrowed(self.upstream_addr.as_str()),
            int_cell(self.upstream_response_length),
            float_cell(self.upstream_response_time),
            match &self.upstream_status {
                UpstreamStatus::Code(code) => Cow::Owned(code.to_string()),
                UpstreamStatus::Raw(token) => Cow::Borrowed(token.as_str()),
            },
            Cow::Borrowed(self.request_id.as_str()),
            Cow::Owned(self.query_keys_count.to_string()),
        ]
    }
}

pub(crate) fn format_utc(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn serialize_utc<S: Serializer>(t: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_utc(t))
}

fn int_cell(value: Option<i64>) -> Cow<'static, str> {
    value.map_or(Cow::Borrowed(""), |n| Cow::Owned(n.to_string()))
}

fn float_cell(value: Option<f64>) -> Cow<'static, str> {
    value.map_or(Cow::Borrowed(""), |n| Cow::Owned(float_text(n)))
}

/// Shortest round-trip text, always with a fraction or exponent: `1.0`,
/// `0.012`, `1e-05`, `1e+16`, `nan`, `-inf`.
fn float_text(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    // Debug switches to exponent form below 1e-4 and from 1e16 upwards.
    let text = format!("{:?}", n);
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}
