//! churnops: Customer Churn Model Pipeline CLI
//!
//! Each stage runs as its own process invocation:
//! `churnops train`, `churnops evaluate`, `churnops publish`.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use churnops::cli::{run_evaluate, run_publish, run_train, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match &cli.command {
        Commands::Train => run_train(&cli.config).map(|_| ()),
        Commands::Evaluate => run_evaluate(&cli.config).map(|_| ()),
        Commands::Publish { folder } => run_publish(&cli.config, folder).map(|_| ()),
    }
}

/// Diagnostic logs go to stderr; `RUST_LOG` overrides the default `warn` level
fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
