//! Errors surfaced by a resolve call.

use crate::locator::LocateError;
use crate::matchspec::MatchSpecError;
use depsolve_schema::JobError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a resolve call.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A repository index or the installed set could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A repository index could not be loaded into the solver.
    #[error("Failed to parse index of repository '{repo}': {source}")]
    Repodata {
        repo: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request itself is inconsistent (e.g. two repositories share a name).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A job string could not be turned into a solver job.
    #[error("Invalid job '{job}': {source}")]
    InvalidJob {
        job: String,
        #[source]
        source: JobError,
    },

    /// A job's match specification could not be parsed.
    #[error(transparent)]
    MatchSpec(#[from] MatchSpecError),

    /// The solver found conflicts; one description per problem, in order.
    #[error("Encountered problems while solving:\n{}", format_problems(.problems))]
    Unsatisfiable { problems: Vec<String> },

    /// A package to install has no usable metadata in its repository index.
    #[error("Failed to extract metadata for '{file}' from repository '{repo}': {source}")]
    MetadataExtraction {
        repo: String,
        file: String,
        #[source]
        source: LocateError,
    },

    /// Pipeline invariant broken (cache miss, dangling obsoletion link, ...).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResolveError {
    /// The solver's problem descriptions, if this is an unsatisfiable request.
    pub fn problems(&self) -> Option<&[String]> {
        match self {
            Self::Unsatisfiable { problems } => Some(problems),
            _ => None,
        }
    }
}

fn format_problems(problems: &[String]) -> String {
    problems
        .iter()
        .map(|p| format!("Problem: {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result alias used throughout the crate.
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
