//! Parsing and export pipeline for nginx-ingress extended access logs.
//!
//! ```text
//! line ─► parsers::nginx ─► coerce / request / time ─► Record
//!      ─► Query::matches ─► buffered Vec ─► sort + limit ─► output
//! ```

pub mod error;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod time;

// Re-export for easy access
pub use error::RunError;
pub use output::OutputFormat;
pub use parsers::{parse_access_line, LineError};
pub use pipeline::{run, RunSummary};
pub use query::{Query, SortKey};
pub use record::{Record, UpstreamStatus};
