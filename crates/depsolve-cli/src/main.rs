//! depsolve CLI

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use depsolve_cli::cmd;
use depsolve_cli::{Cli, Commands};

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve(args) => cmd::solve::solve(args, cli.quiet),
        Commands::Locate { index, key } => {
            cmd::locate::locate_package(&index, &key)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
