//! Operator is a long lived process that keeps Deployment resources aligned with ResourcePolicy objects.
#![deny(missing_docs)]

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use elasticsearch_common::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// OTLP collector endpoint, traces are only exported when set.
    #[arg(long, env = "OPERATOR_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,
}

/// Available Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the daemon
    Daemon(DaemonOpts),
}

/// Options for the daemon subcommand
#[derive(clap::Args, Debug)]
pub struct DaemonOpts {
    /// Seconds to wait before reconciling a policy again after a successful pass.
    #[arg(long, env = "OPERATOR_REQUEUE_SECONDS", default_value_t = 30)]
    requeue_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    telemetry::init(args.otlp_endpoint.clone())?;

    info!(?args.command, ?args.otlp_endpoint, "starting operator");
    match args.command {
        Command::Daemon(opts) => {
            elasticsearch_operator::policy::run(Duration::from_secs(opts.requeue_seconds)).await?
        }
    };

    // Flush traces before shutdown
    telemetry::shutdown();
    Ok(())
}
