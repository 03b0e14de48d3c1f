use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, ValueEnum};
use ingresslens::time::parse_time_bound;
use ingresslens::{OutputFormat, Query, RunError, RunSummary, SortKey};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

/// Parse an nginx-ingress access log and export it as CSV.
#[derive(Parser, Debug)]
#[command(name = "ingresslens", version, about, long_about = None)]
struct Cli {
    /// Path to the nginx access log.
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the output file. Parent directories are created.
    #[arg(short, long)]
    output: PathBuf,

    /// Keep only these HTTP statuses, e.g. --status 200 404
    #[arg(long, num_args = 1..)]
    status: Vec<i64>,

    /// Keep only these methods, e.g. --method GET POST
    #[arg(long, num_args = 1..)]
    method: Vec<String>,

    /// Keep only rows whose path contains this substring.
    #[arg(long)]
    path_contains: Option<String>,

    /// Keep only these client addresses.
    #[arg(long, num_args = 1..)]
    ip: Vec<String>,

    /// Earliest time to keep, e.g. 2021-04-26T21:20:00Z or "2h ago".
    #[arg(long, value_parser = parse_time_bound)]
    since: Option<DateTime<Utc>>,

    /// Latest time to keep, e.g. 2021-04-26T21:30:00Z or "now".
    #[arg(long, value_parser = parse_time_bound)]
    until: Option<DateTime<Utc>>,

    /// Column to sort by.
    #[arg(long, value_enum, default_value_t = SortArg::TimeUtc)]
    sort_by: SortArg,

    /// Sort descending.
    #[arg(long)]
    desc: bool,

    /// Write only the first N rows after filtering and sorting.
    #[arg(long)]
    limit: Option<usize>,

    /// Fail if any line does not match the expected format.
    #[arg(long)]
    strict: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,

    /// Log progress to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    #[value(name = "time_utc")]
    TimeUtc,
    #[value(name = "status")]
    Status,
    #[value(name = "request_time")]
    RequestTime,
    #[value(name = "body_bytes_sent")]
    BodyBytesSent,
    #[value(name = "upstream_response_time")]
    UpstreamResponseTime,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::TimeUtc => SortKey::TimeUtc,
            SortArg::Status => SortKey::Status,
            SortArg::RequestTime => SortKey::RequestTime,
            SortArg::BodyBytesSent => SortKey::BodyBytesSent,
            SortArg::UpstreamResponseTime => SortKey::UpstreamResponseTime,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Csv,
    Jsonl,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Jsonl => OutputFormat::JsonLines,
        }
    }
}

impl Cli {
    fn query(&self) -> Query {
        Query {
            status: non_empty(&self.status),
            method: non_empty(&self.method),
            path_contains: self.path_contains.clone(),
            ip: non_empty(&self.ip),
            since: self.since,
            until: self.until,
            sort_by: self.sort_by.into(),
            descending: self.desc,
            limit: self.limit,
            strict: self.strict,
        }
    }
}

fn non_empty<T: Clone + Eq + std::hash::Hash>(values: &[T]) -> Option<HashSet<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().cloned().collect())
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn try_main(cli: &Cli) -> anyhow::Result<RunSummary> {
    let query = cli.query();
    tracing::debug!(?query, input = %cli.input.display(), "resolved query");
    let summary = ingresslens::run(&cli.input, &cli.output, &query, cli.format.into())?;
    Ok(summary)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match try_main(&cli) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            let code = err.downcast_ref::<RunError>().map_or(1, RunError::exit_code);
            ExitCode::from(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_build_query() {
        let cli = Cli::try_parse_from([
            "ingresslens",
            "-i",
            "access.log",
            "-o",
            "out.csv",
            "--status",
            "200",
            "404",
            "--method",
            "GET",
            "--since",
            "2021-04-26T21:20:00Z",
            "--sort-by",
            "request_time",
            "--desc",
            "--limit",
            "5",
            "--strict",
        ])
        .unwrap();
        let query = cli.query();

        assert_eq!(query.status, Some(HashSet::from([200, 404])));
        assert_eq!(query.method, Some(HashSet::from(["GET".to_string()])));
        assert_eq!(query.ip, None);
        assert_eq!(query.sort_by, SortKey::RequestTime);
        assert!(query.descending);
        assert_eq!(query.limit, Some(5));
        assert!(query.strict);
        assert_eq!(
            query.since.map(|t| t.to_rfc3339()),
            Some("2021-04-26T21:20:00+00:00".to_string())
        );
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["ingresslens", "-i", "a.log", "-o", "a.csv"]).unwrap();
        let query = cli.query();
        assert_eq!(query, Query::default());
        assert!(matches!(cli.format, FormatArg::Csv));
    }

    #[rstest]
    #[case("time_utc", SortKey::TimeUtc)]
    #[case("status", SortKey::Status)]
    #[case("request_time", SortKey::RequestTime)]
    #[case("body_bytes_sent", SortKey::BodyBytesSent)]
    #[case("upstream_response_time", SortKey::UpstreamResponseTime)]
    fn sort_by_names(#[case] name: &str, #[case] key: SortKey) {
        let cli =
            Cli::try_parse_from(["ingresslens", "-i", "a.log", "-o", "a.csv", "--sort-by", name])
                .unwrap();
        assert_eq!(cli.query().sort_by, key);
        assert_eq!(key.to_string(), name);
    }

    #[rstest]
    #[case(&["--sort-by", "latency"])]
    #[case(&["--format", "ndjson"])]
    #[case(&["--format", "xml"])]
    #[case(&["--since", "300000years"])]
    #[case(&["--until", "not-a-time"])]
    fn invalid_values_are_usage_errors(#[case] extra: &[&str]) {
        let mut args = vec!["ingresslens", "-i", "a.log", "-o", "a.csv"];
        args.extend_from_slice(extra);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn jsonl_format_maps_to_json_lines() {
        let cli = Cli::try_parse_from(["ingresslens", "-i", "a.log", "-o", "a.jsonl", "--format", "jsonl"])
            .unwrap();
        assert_eq!(OutputFormat::from(cli.format), OutputFormat::JsonLines);
    }

    #[test]
    fn bad_time_bound_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "ingresslens",
            "-i",
            "a.log",
            "-o",
            "a.csv",
            "--until",
            "not-a-time",
        ]);
        assert!(result.is_err());
    }
}
