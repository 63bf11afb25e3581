//! depsolve - resolve package jobs against JSON repository indexes
#![allow(clippy::missing_errors_doc)]
//!
//! The binary loads one or more repository indexes (`{"packages": {...}}`),
//! an optional installed set and a list of jobs, runs the solver and prints
//! the packages to install (with their verbatim index metadata) and the
//! packages to remove as JSON.

pub mod cmd;

use clap::{Parser, Subcommand};
use depsolve_schema::{RepositorySource, SolverOption};
use std::path::PathBuf;

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(name = "depsolve")]
#[command(author, version, about = "depsolve - resolve package jobs against repository indexes")]
pub struct Cli {
    /// Suppress progress and diagnostic output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Solve jobs and print the resulting installs and removals as JSON
    Solve(SolveArgs),
    /// Print the raw metadata object of one package in an index
    Locate {
        /// Repository index file
        index: PathBuf,
        /// Package file name (key under "packages")
        key: String,
    },
}

/// Arguments of `depsolve solve`.
#[derive(Debug, clap::Args)]
pub struct SolveArgs {
    /// Request file (TOML); command-line values are added to it
    #[arg(long, short, env = "DEPSOLVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository to solve against
    #[arg(long = "repo", value_name = "NAME=PATH[:PRIO]")]
    pub repos: Vec<RepositorySource>,

    /// Index file describing the installed packages
    #[arg(long)]
    pub installed: Option<PathBuf>,

    /// Treat jobs without an action word as updates
    #[arg(long)]
    pub update: bool,

    /// Do not report jobs that match nothing
    #[arg(long)]
    pub weak: bool,

    /// Solver option
    #[arg(long = "option", value_name = "ID=VALUE")]
    pub options: Vec<SolverOption>,

    /// Jobs, e.g. "numpy >=1.20" or "remove pandas"
    pub jobs: Vec<String>,
}
