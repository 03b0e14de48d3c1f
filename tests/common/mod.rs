//! Shared fixtures for the integration harnesses.
//!
//! Import with `mod common; use common::*;`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Well-formed lines, deliberately out of time order.
pub const CORPUS_VALID: &[&str] = &[
    r#"10.0.0.1 - - [26/Apr/2021:21:20:17 +0000] "GET /a?x=1&y=2 HTTP/1.1" 200 123 "-" "ua" 45 0.012 [svc] [] 10.0.0.2:80 123 0.010 200 req-1"#,
    r#"10.0.0.3 - - [26/Apr/2021:21:18:02 +0000] "POST /api/orders HTTP/2.0" 201 512 "https://shop.example/cart" "Mozilla/5.0 (X11; Linux x86_64)" 980 0.250 [default-orders-80] [] 10.0.0.7:8080 512 0.248 201 req-2"#,
    r#"10.0.0.1 - - [26/Apr/2021:23:25:40 +0200] "GET /api/items?page=2&page=3&sort=asc HTTP/1.1" 404 0 "-" "curl/7.68.0" 88 - [default-items-80] [] 10.0.0.8:8080 0 - 404 req-3"#,
    r#"10.0.0.9 - - [26/Apr/2021:21:22:59 +0000] "GET https://api.example.com/v1/health?check=1 HTTP/1.1" 502 150 "-" "kube-health/1.20" 120 1.500 [default-api-80] [api-canary] 10.0.0.5:80 - 1.499 - req-4"#,
    r#"10.0.0.4 - - [26/Apr/2021:21:19:30 +0000] "GET /static/app.js HTTP/1.1" 200 20480 "https://shop.example/" "Mozilla/5.0" 310 0.004 [default-static-80] [] 10.0.0.6:80 20480 0.003 200 req-5"#,
];

/// Lines that fail the grammar.
pub const CORPUS_MALFORMED: &[&str] = &[
    "this is not an access log line",
    r#"10.0.0.1 - - [26/Apr/2021:21:20:17 +0000] "GET / HTTP/1.1" 200 123 "-" "ua""#,
    r#"10.0.0.1 - - [26/Apr/2021:21:20:17 +0000] "GET / HTTP/1.1" 20 123 "-" "ua" 45 0.012 [svc] [] 10.0.0.2:80 123 0.010 200 req-x"#,
];

/// Matches the grammar but the timestamp is unreadable.
pub const LINE_BAD_TIME: &str = r#"10.0.0.1 - - [2021-04-26 21:20:17] "GET / HTTP/1.1" 200 1 "-" "ua" 45 0.012 [svc] [] 10.0.0.2:80 1 0.010 200 req-t"#;

/// Temporary directory holding one input log.
pub struct Workspace {
    pub dir: TempDir,
    pub input: PathBuf,
}

impl Workspace {
    pub fn with_lines(lines: &[&str]) -> Self {
        Self::with_bytes(lines.join("\n").as_bytes())
    }

    pub fn with_bytes(bytes: &[u8]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let input = dir.path().join("access.log");
        fs::write(&input, bytes).expect("write input log");
        Self { dir, input }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Reads a CSV written by the pipeline into header + rows of cells.
/// Only handles cells without embedded commas or quotes.
pub fn read_simple_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let text = fs::read_to_string(path).expect("read output");
    let mut rows = text
        .split_terminator("\r\n")
        .map(|row| row.split(',').map(str::to_string).collect::<Vec<_>>());
    let header = rows.next().expect("header row");
    (header, rows.collect())
}

/// Index of a named column in a header row.
pub fn column(header: &[String], name: &str) -> usize {
    header
        .iter()
        .position(|h| h == name)
        .unwrap_or_else(|| panic!("missing column {name}"))
}
