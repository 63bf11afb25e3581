//! Shared types for depsolve.
//!
//! Everything that crosses the boundary between the solver, the transaction
//! classifier and the callers of a resolve lives here: repository sources,
//! jobs and their flags, solver options, transaction classes, and the
//! install/remove records handed back to the application.

pub mod class;
pub mod job;
pub mod record;
pub mod repodata;
pub mod repository;

// Re-exports
pub use class::TransactionClass;
pub use job::{JobAction, JobError, JobFlags, SolveJob, SolverOption};
pub use record::{InstallRecord, RemoveRecord, Resolution};
pub use repodata::{PackageRecord, RepoData};
pub use repository::RepositorySource;

/// Name of the pseudo-repository holding the installed package set.
pub const INSTALLED_REPO: &str = "installed";
