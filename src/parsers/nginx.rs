// File: src/parsers/nginx.rs

use regex::Regex;
use std::sync::OnceLock;

/// nginx-ingress `upstreaminfo` log format. The whole line must match.
///
/// ```text
/// $remote_addr - $remote_user [$time_local] "$request" $status $body_bytes_sent
/// "$http_referer" "$http_user_agent" $request_length $request_time
/// [$proxy_upstream_name] [$proxy_alternative_upstream_name] $upstream_addr
/// $upstream_response_length $upstream_response_time $upstream_status $req_id
/// ```
const INGRESS_PATTERN: &str = concat!(
    r"^",
    r"(?P<remote_addr>\S+)\s+\S+\s+\S+\s+",
    r"\[(?P<time_local>[^\]]+)\]\s+",
    r#""(?P<request>[^"]*)"\s+"#,
    r"(?P<status>\d{3})\s+",
    r"(?P<body_bytes_sent>\S+)\s+",
    r#""(?P<http_referer>[^"]*)"\s+"#,
    r#""(?P<http_user_agent>[^"]*)"\s+"#,
    r"(?P<request_length>\S+)\s+",
    r"(?P<request_time>\S+)\s+",
    r"\[(?P<upstream_name>[^\]]*)\]\s+",
    r"\[(?P<upstream_alternative>[^\]]*)\]\s+",
    r"(?P<upstream_addr>\S+)\s+",
    r"(?P<upstream_response_length>\S+)\s+",
    r"(?P<upstream_response_time>\S+)\s+",
    r"(?P<upstream_status>\S+)\s+",
    r"(?P<request_id>\S+)",
    r"$",
);

fn ingress_regex() -> &'static Regex {
    static INGRESS_REGEX: OnceLock<Regex> = OnceLock::new();
    INGRESS_REGEX.get_or_init(|| Regex::new(INGRESS_PATTERN).expect("Invalid ingress log regex"))
}

/// Raw captures of one matched line, borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngressCaptures<'a> {
    pub remote_addr: &'a str,
    pub time_local: &'a str,
    pub request: &'a str,
    pub status: &'a str,
    pub body_bytes_sent: &'a str,
    pub http_referer: &'a str,
    pub http_user_agent: &'a str,
    pub request_length: &'a str,
    pub request_time: &'a str,
    pub upstream_name: &'a str,
    pub upstream_alternative: &'a str,
    pub upstream_addr: &'a str,
    pub upstream_response_length: &'a str,
    pub upstream_response_time: &'a str,
    pub upstream_status: &'a str,
    pub request_id: &'a str,
}

/// Matches one line (without its newline) against the ingress grammar.
/// Returns `None` if any part of the line deviates from it.
pub fn match_ingress_line(line: &str) -> Option<IngressCaptures<'_>> {
    let caps = ingress_regex().captures(line)?;
    // Every group is mandatory in the pattern, so a match fills all of them.
    let field = |name: &str| caps.name(name).map_or("", |m| m.as_str());

    Some(IngressCaptures {
        remote_addr: field("remote_addr"),
        time_local: field("time_local"),
        request: field("request"),
        status: field("status"),
        body_bytes_sent: field("body_bytes_sent"),
        http_referer: field("http_referer"),
        http_user_agent: field("http_user_agent"),
        request_length: field("request_length"),
        request_time: field("request_time"),
        upstream_name: field("upstream_name"),
        upstream_alternative: field("upstream_alternative"),
        upstream_addr: field("upstream_addr"),
        upstream_response_length: field("upstream_response_length"),
        upstream_response_time: field("upstream_response_time"),
        upstream_status: field("upstream_status"),
        request_id: field("request_id"),
    })
}
