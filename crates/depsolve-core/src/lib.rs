pub mod cache;
pub mod classify;
pub mod error;
pub mod locator;
pub mod matchspec;
pub mod reporter;
#[cfg(feature = "parsing")]
pub mod request;
pub mod resolve;
pub mod solver;

pub use cache::RepoTextCache;
pub use classify::{ClassBatch, ClassifyMode, PackageRef, TransactionView, classify};
pub use error::{ResolveError, Result};
pub use locator::{LocateError, locate};
pub use matchspec::{MatchSpec, MatchSpecError};
pub use reporter::{NullReporter, Reporter, StderrReporter};
pub use resolve::{ResolveRequest, attach_metadata, resolve};
pub use solver::{Pool, SolveError, Solver, Transaction};

