//! apicmp
//!
//! Replays the rows of a CSV file against two deployments of an HTTP API and
//! reports every difference in status code or response body.
//!
//! Exit codes: 0 when every row was compared (differences included), 130
//! when interrupted, 1 on configuration or transport errors.

mod cli;

use anyhow::{Context, Result};
use apicmp_config::{read_rows, Plugin};
use apicmp_diff::{Comparer, DiffOptions, Differ};
use apicmp_dispatch::{Dispatcher, HttpTransport, RunOutcome};
use apicmp_report::Stats;
use clap::Parser;
use cli::Args;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const EXIT_INTERRUPTED: u8 = 130;

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{}'", level))?,
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(args: Args) -> Result<RunOutcome> {
    let plugin = match &args.plugin {
        Some(path) => Plugin::load(path)?,
        None => Plugin::default(),
    };
    let config = args.dispatcher_config(plugin.known_headers.clone())?;
    let rows = read_rows(&args.file, &args.rows)?;

    let transport = Arc::new(HttpTransport::new()?);
    let mut dispatcher = Dispatcher::new(config, transport)?;
    if let Some(transform) = plugin.transform.clone() {
        dispatcher = dispatcher.with_transform(transform);
    }

    let differ = Differ::new(
        DiffOptions::new()
            .with_equality(plugin.equality.clone())
            .with_ignore(plugin.ignore.clone())
            .superset(args.superset()),
    );
    let mut comparer = Comparer::new(differ, Stats::new());

    let token = dispatcher.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("==========  Interrupt signal received  ==========");
            token.cancel();
        }
    });

    let result = dispatcher.run(&rows, &mut comparer).await;
    interrupt.abort();
    comparer.stats().print_stats();

    Ok(result?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = init_tracing(&args.loglevel) {
        eprintln!("error: {:#}", err);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(RunOutcome::Completed) => ExitCode::SUCCESS,
        Ok(RunOutcome::Aborted) => {
            info!("Run aborted by user");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(err) => {
            error!("error executing apicmp: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
