//! Command-line arguments

use apicmp_config::{parse_headers, ConfigResult, DEFAULT_HEADER};
use apicmp_dispatch::{DispatcherConfig, KnownHeaders, RetryPolicy};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// How strictly the "after" body must match the "before" body
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatchMode {
    /// Both bodies must have the same structure
    Exact,
    /// "after" may contain keys "before" does not have
    Superset,
}

#[derive(Debug, Parser)]
#[command(name = "apicmp")]
#[command(version)]
#[command(about = "Replay recorded requests against two API deployments and report differences")]
#[command(
    long_about = "apicmp replays every row of a CSV file against a \"before\" and an \"after\" host\n\
and reports each difference in status code or response body.\n\
\n\
Examples:\n  \
apicmp -B https://api.example.com -A https://qa-api.example.com -F fixtures.csv\n  \
apicmp -B ... -A ... -F fixtures.csv -R 1,7,12 --loglevel debug\n  \
apicmp -B ... -A ... -F fixtures.csv --retry 424,500 --match superset --plugin plugin.yaml"
)]
pub struct Args {
    /// Base URL of the deployment to compare against
    #[arg(short = 'B', long, env = "APICMP_BEFORE")]
    pub before: String,

    /// Base URL of the deployment under test
    #[arg(short = 'A', long, env = "APICMP_AFTER")]
    pub after: String,

    /// CSV file with the recorded requests
    #[arg(short = 'F', long, env = "APICMP_FILE")]
    pub file: PathBuf,

    /// Header sent to both hosts, as 'key: value' (repeatable)
    #[arg(short = 'H', long = "header", default_value = DEFAULT_HEADER)]
    pub headers: Vec<String>,

    /// Only replay these row indices (e.g. 1,7,12)
    #[arg(short = 'R', long, value_delimiter = ',')]
    pub rows: Vec<usize>,

    /// HTTP status codes to retry (e.g. 424,500)
    #[arg(long = "retry", value_delimiter = ',')]
    pub retry: Vec<u16>,

    /// Body matching mode
    #[arg(long = "match", value_enum, default_value_t = MatchMode::Exact)]
    pub match_mode: MatchMode,

    /// Rows replayed concurrently
    #[arg(long, default_value_t = 4)]
    pub threads: usize,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info", env = "APICMP_LOGLEVEL")]
    pub loglevel: String,

    /// YAML plugin with ignore patterns, equality settings and per-host headers
    #[arg(long)]
    pub plugin: Option<PathBuf>,

    /// Wait between retries, in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub backoff_ms: u64,
}

impl Args {
    pub fn superset(&self) -> bool {
        self.match_mode == MatchMode::Superset
    }

    /// Dispatcher settings derived from the arguments
    pub fn dispatcher_config(&self, known_headers: KnownHeaders) -> ConfigResult<DispatcherConfig> {
        Ok(DispatcherConfig {
            before: self.before.clone(),
            after: self.after.clone(),
            threads: self.threads,
            retry: RetryPolicy::new(self.retry.iter().copied())
                .with_backoff(Duration::from_millis(self.backoff_ms)),
            headers: parse_headers(self.headers.iter().map(String::as_str))?,
            known_headers,
        })
    }
}
