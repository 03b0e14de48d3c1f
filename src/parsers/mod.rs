// File: src/parsers/mod.rs

pub mod coerce;
pub mod nginx;
pub mod request;

use crate::record::Record;
use crate::time;
use thiserror::Error;

/// Why a single line produced no record.
///
/// The two variants carry different weight: a structural mismatch is
/// usually skipped and counted, while a bad timestamp on a line that did
/// match means the time key itself is unusable.
#[derive(Debug, Error)]
pub enum LineError {
    #[error("line does not match the ingress log format")]
    StructuralMismatch,

    #[error("invalid time_local '{value}': {source}")]
    TimeFormat {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Parses one access-log line (without its newline) into a [`Record`].
pub fn parse_access_line(line: &str) -> Result<Record, LineError> {
    let caps = nginx::match_ingress_line(line).ok_or(LineError::StructuralMismatch)?;

    let time_utc = time::parse_time_local(caps.time_local).map_err(|source| LineError::TimeFormat {
        value: caps.time_local.to_string(),
        source,
    })?;

    let req = request::split_request(caps.request);
    let query_keys_count = request::count_query_keys(&req.query);

    Ok(Record {
        remote_addr: caps.remote_addr.to_string(),
        time_local: caps.time_local.to_string(),
        time_utc,
        method: req.method,
        uri: req.uri,
        path: req.path,
        proto: req.proto,
        status: coerce::lenient_int(caps.status),
        body_bytes_sent: coerce::lenient_int(caps.body_bytes_sent),
        http_referer: caps.http_referer.to_string(),
        http_user_agent: caps.http_user_agent.to_string(),
        request_length: coerce::lenient_int(caps.request_length),
        request_time: coerce::lenient_float(caps.request_time),
        upstream_name: caps.upstream_name.to_string(),
        upstream_alternative: caps.upstream_alternative.to_string(),
        upstream_addr: caps.upstream_addr.to_string(),
        upstream_response_length: coerce::lenient_int(caps.upstream_response_length),
        upstream_response_time: coerce::lenient_float(caps.upstream_response_time),
        upstream_status: coerce::upstream_status(caps.upstream_status),
        request_id: caps.request_id.to_string(),
        query_keys_count,
    })
}
