//! # jobtmp
//!
//! Per-job private temporary directories for batch-scheduled jobs.
//! Run from the scheduler's prolog to create the directories, and as a
//! wrapper around the job payload to enter the private mount namespace.

mod commands;
mod plugstack;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    commands::execute(cli)
}
