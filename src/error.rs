// File: src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a whole run stops.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read input {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line_no} does not match format:\n{line}")]
    StructuralMismatch { line_no: usize, line: String },

    #[error("line {line_no} has an invalid time_local '{value}': {source}")]
    TimeFormat {
        line_no: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("failed to write output {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Process exit status for this failure. Each operator-visible cause
    /// gets its own code.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::InputNotFound { .. } => 2,
            RunError::StructuralMismatch { .. } => 3,
            RunError::TimeFormat { .. } => 4,
            RunError::ReadInput { .. } | RunError::WriteOutput { .. } => 1,
        }
    }

    pub fn write_output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteOutput {
            path: path.into(),
            source,
        }
    }
}
