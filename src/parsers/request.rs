// File: src/parsers/request.rs

use std::collections::HashSet;
use url::form_urlencoded;

/// `$request` split into its parts. Missing tokens are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub uri: String,
    pub path: String,
    pub query: String,
    pub proto: String,
}

/// Splits "METHOD URI PROTO". A short or empty request line never fails,
/// it just leaves the missing parts empty.
pub fn split_request(request: &str) -> RequestLine {
    let mut parts = request.split_whitespace();
    let method = parts.next().unwrap_or("");
    let uri = parts.next().unwrap_or("");
    let proto = parts.next().unwrap_or("");

    let (path, query) = split_uri(uri);

    RequestLine {
        method: method.to_string(),
        uri: uri.to_string(),
        path,
        query,
        proto: proto.to_string(),
    }
}

/// Path and query of a request target, absolute (`http://host/p?q`) or
/// origin-form (`/p?q`). The path is returned as written, never normalised.
pub fn split_uri(uri: &str) -> (String, String) {
    if uri.contains("://") {
        // e.g. "/redirect?to=http://x" has no scheme and falls through.
        if let Some((path, query)) = split_absolute(uri) {
            return (path.to_string(), query.to_string());
        }
    }

    match uri.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (uri.to_string(), String::new()),
    }
}

/// `scheme://authority/path?query#fragment` with the authority and the
/// fragment dropped. `None` if the text before the first `:` is not a scheme.
fn split_absolute(uri: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid_scheme {
        return None;
    }

    let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
    let target = match rest.strip_prefix("//") {
        Some(after) => &after[after.find(['/', '?']).unwrap_or(after.len())..],
        None => rest,
    };
    Some(target.split_once('?').unwrap_or((target, "")))
}

/// Number of distinct parameter names in a query string.
///
/// Names are form-decoded (`a+b` and `a%20b` are the same name) and pairs
/// without a value do not count. Malformed input yields fewer keys, never
/// an error.
pub fn count_query_keys(query: &str) -> usize {
    if query.is_empty() {
        return 0;
    }
    form_urlencoded::parse(query.as_bytes())
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, _)| name)
        .collect::<HashSet<_>>()
        .len()
}
