// File: src/output.rs

use crate::record::{Record, COLUMNS};
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    /// One JSON object per line.
    JsonLines,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputFormat::Csv => f.write_str("csv"),
            OutputFormat::JsonLines => f.write_str("jsonl"),
        }
    }
}

pub fn write_records<W: Write>(out: W, records: &[Record], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Csv => write_csv(out, records),
        OutputFormat::JsonLines => write_json_lines(out, records),
    }
}

/// Header row, then one row per record. Rows end in CRLF.
pub fn write_csv<W: Write>(mut out: W, records: &[Record]) -> io::Result<()> {
    write_csv_row(&mut out, COLUMNS.iter().map(|c| Cow::Borrowed(*c)))?;
    for record in records {
        write_csv_row(&mut out, record.cells())?;
    }
    out.flush()
}

fn write_csv_row<'a, W, I>(out: &mut W, cells: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = Cow<'a, str>>,
{
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        out.write_all(escape_csv(&cell).as_bytes())?;
    }
    out.write_all(b"\r\n")
}

/// Quotes a cell only when it holds a comma, quote, CR or LF.
fn escape_csv(cell: &str) -> Cow<'_, str> {
    if cell.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

pub fn write_json_lines<W: Write>(mut out: W, records: &[Record]) -> io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}
