// File: src/pipeline.rs

use crate::error::RunError;
use crate::output::{self, OutputFormat};
use crate::parsers::{parse_access_line, LineError};
use crate::query::Query;
use crate::record::Record;
use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Records that survived the filters, in input order, plus how many
/// non-blank lines did not fit the grammar.
#[derive(Debug, Default)]
pub struct Collected {
    pub records: Vec<Record>,
    pub bad_lines: usize,
}

/// Parses and filters every line of `text`.
///
/// Blank lines are skipped without being counted. Lines that do not match
/// the grammar are counted, or end the run in strict mode. A matched line
/// with an unreadable timestamp always ends the run.
pub fn collect(text: &str, query: &Query) -> Result<Collected, RunError> {
    let mut collected = Collected::default();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        match parse_access_line(line) {
            Ok(record) => {
                if query.matches(&record) {
                    collected.records.push(record);
                }
            }
            Err(LineError::StructuralMismatch) => {
                collected.bad_lines += 1;
                if query.strict {
                    tracing::warn!(line_no, "strict mode: line does not match format");
                    return Err(RunError::StructuralMismatch {
                        line_no,
                        line: line.to_string(),
                    });
                }
                tracing::debug!(line_no, "skipping line that does not match format");
            }
            Err(LineError::TimeFormat { value, source }) => {
                tracing::error!(line_no, %value, "unparseable time_local");
                return Err(RunError::TimeFormat {
                    line_no,
                    value,
                    source,
                });
            }
        }
    }

    Ok(collected)
}

/// Parse, filter, sort and limit in one go.
pub fn process(text: &str, query: &Query) -> Result<(Vec<Record>, usize), RunError> {
    let Collected { records, bad_lines } = collect(text, query)?;
    Ok((query.finish(records), bad_lines))
}

/// End-of-run figures reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub kept: usize,
    pub bad_lines: usize,
    pub output: PathBuf,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "OK: parsed={} rows, skipped_bad_lines={}, output={}",
            self.kept,
            self.bad_lines,
            self.output.display()
        )
    }
}

/// Reads `input`, runs the pipeline and writes the result to `output`.
///
/// Invalid UTF-8 in the input is replaced rather than rejected. Missing
/// parent directories of `output` are created. Nothing is written if the
/// run fails.
pub fn run(
    input: &Path,
    output: &Path,
    query: &Query,
    format: OutputFormat,
) -> Result<RunSummary, RunError> {
    if !input.exists() {
        return Err(RunError::InputNotFound {
            path: input.to_path_buf(),
        });
    }
    let bytes = fs::read(input).map_err(|source| RunError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let (records, bad_lines) = process(&text, query)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RunError::write_output(output, e))?;
    }
    let file = File::create(output).map_err(|e| RunError::write_output(output, e))?;
    output::write_records(BufWriter::new(file), &records, format)
        .map_err(|e| RunError::write_output(output, e))?;

    let summary = RunSummary {
        kept: records.len(),
        bad_lines,
        output: output.to_path_buf(),
    };
    tracing::info!(
        kept = summary.kept,
        bad_lines = summary.bad_lines,
        output = %summary.output.display(),
        %format,
        sort_by = %query.sort_by,
        "run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GOOD: &str = r#"10.0.0.1 - - [26/Apr/2021:21:20:17 +0000] "GET /a?x=1&y=2 HTTP/1.1" 200 123 "-" "ua" 45 0.012 [svc] [] 10.0.0.2:80 123 0.010 200 req-1"#;

    #[test]
    fn blank_lines_are_not_bad_lines() {
        let text = format!("\n   \n{}\n\t\n", GOOD);
        let collected = collect(&text, &Query::default()).unwrap();
        assert_eq!(collected.records.len(), 1);
        assert_eq!(collected.bad_lines, 0);
    }

    #[test]
    fn mismatches_are_counted_and_skipped() {
        let text = format!("garbage\n{}\na b c d e f g h i j\n", GOOD);
        let collected = collect(&text, &Query::default()).unwrap();
        assert_eq!(collected.records.len(), 1);
        assert_eq!(collected.bad_lines, 2);
    }

    #[test]
    fn strict_mode_stops_at_first_mismatch() {
        let query = Query {
            strict: true,
            ..Query::default()
        };
        let text = format!("{}\n\ngarbage\n{}\n", GOOD, GOOD);
        match collect(&text, &query).unwrap_err() {
            RunError::StructuralMismatch { line_no, line } => {
                assert_eq!(line_no, 3);
                assert_eq!(line, "garbage");
            }
            other => panic!("expected StructuralMismatch, got {:?}", other),
        }
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let text = format!("{}\r\n{}\r\n", GOOD, GOOD);
        let collected = collect(&text, &Query::default()).unwrap();
        assert_eq!(collected.records.len(), 2);
        assert_eq!(collected.bad_lines, 0);
    }

    // Timestamps are the primary sort and filter key, so a matched line with
    // a broken one ends the run even outside strict mode.
    #[test]
    fn bad_time_local_is_fatal_without_strict() {
        let broken = GOOD.replace("26/Apr/2021", "26/Apx/2021");
        let text = format!("{}\n{}\n", GOOD, broken);
        match collect(&text, &Query::default()).unwrap_err() {
            RunError::TimeFormat { line_no, value, .. } => {
                assert_eq!(line_no, 2);
                assert_eq!(value, "26/Apx/2021:21:20:17 +0000");
            }
            other => panic!("expected TimeFormat, got {:?}", other),
        }
    }

    #[test]
    fn filtered_records_are_not_bad_lines() {
        let query = Query {
            method: Some(["POST".to_string()].into()),
            ..Query::default()
        };
        let collected = collect(GOOD, &query).unwrap();
        assert!(collected.records.is_empty());
        assert_eq!(collected.bad_lines, 0);
    }

    #[test]
    fn summary_line() {
        let summary = RunSummary {
            kept: 3,
            bad_lines: 1,
            output: PathBuf::from("out/result.csv"),
        };
        assert_eq!(
            summary.to_string(),
            "OK: parsed=3 rows, skipped_bad_lines=1, output=out/result.csv"
        );
    }
}
