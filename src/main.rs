//! SQLPulse CLI entry point

use clap::Parser;
use sqlpulse::benchmark::oltp::OltpBench;
use sqlpulse::config::cli::{BenchCommand, Cli, OltpAction};
use sqlpulse::runner::Runner;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr; stdout is reserved for the report.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (read_write, action) = match cli.command {
        BenchCommand::OltpReadOnly { action } => (false, action),
        BenchCommand::OltpReadWrite { action } => (true, action),
    };

    let bench = Arc::new(OltpBench::new(
        cli.oltp,
        read_write,
        cli.runner.threads as u32,
    ));
    let runner = Runner::new(cli.runner, bench);

    match action {
        OltpAction::Prepare => runner.prepare().await,
        OltpAction::Run => runner.run().await,
    }
}
