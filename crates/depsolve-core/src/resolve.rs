//! The resolve pipeline: load repositories, solve, classify, attach metadata.

use crate::cache::RepoTextCache;
use crate::classify::{ClassifyMode, classify};
use crate::error::{ResolveError, Result};
use crate::locator::locate;
use crate::reporter::{NullReporter, Reporter};
use crate::solver::{Pool, RepoId, SolveError, Solver};
use depsolve_schema::{
    INSTALLED_REPO, InstallRecord, JobFlags, RepositorySource, Resolution, SolveJob, SolverOption,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Everything a single resolve call needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// Repositories to solve against, in registration order.
    pub repositories: Vec<RepositorySource>,
    /// Index file describing the installed packages, if any.
    pub installed: Option<PathBuf>,
    /// Job strings (match specifications, optionally led by an action word).
    pub jobs: Vec<String>,
    /// Flags applied to every job.
    pub job_flags: JobFlags,
    /// Solver options, applied in order.
    pub options: Vec<SolverOption>,
    /// Suppress progress and diagnostic output.
    pub quiet: bool,
}

/// Run one resolve.
///
/// Every repository index is read once; its text is kept in a
/// [`RepoTextCache`] so the metadata of each package to install can be cut
/// out of it verbatim after solving. The installed set is registered as the
/// [`INSTALLED_REPO`] repository and is not cached, since nothing is ever
/// installed from it.
///
/// # Errors
///
/// - [`ResolveError::Io`] if an index cannot be read
/// - [`ResolveError::Unsatisfiable`] with every problem, in the solver's order
/// - [`ResolveError::MetadataExtraction`] naming the repository and file whose
///   metadata could not be extracted
pub fn resolve(request: &ResolveRequest, reporter: &dyn Reporter) -> Result<Resolution> {
    let reporter: &dyn Reporter = if request.quiet {
        &NullReporter
    } else {
        reporter
    };

    let mut pool = Pool::new();
    let mut cache = RepoTextCache::new();

    if let Some(path) = &request.installed {
        let text = read_index(path)?;
        let repo = pool.add_repo(INSTALLED_REPO, 0);
        pool.set_installed(repo);
        load_index(&mut pool, repo, INSTALLED_REPO, &text, reporter)?;
    }

    let mut seen = HashSet::new();
    for source in &request.repositories {
        if source.name == INSTALLED_REPO || !seen.insert(source.name.as_str()) {
            return Err(ResolveError::InvalidRequest(format!(
                "repository name '{}' is used more than once",
                source.name
            )));
        }
        let text = read_index(&source.path)?;
        let repo = pool.add_repo(&source.name, source.priority);
        load_index(&mut pool, repo, &source.name, &text, reporter)?;
        cache.put(source.name.as_str(), text);
    }

    let mut solver = Solver::new(&pool);
    for option in &request.options {
        solver.set_flag(option.id, option.value);
    }

    let jobs = request
        .jobs
        .iter()
        .map(|job| {
            SolveJob::parse(job, request.job_flags).map_err(|source| ResolveError::InvalidJob {
                job: job.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let transaction = match solver.solve(&jobs) {
        Ok(transaction) => transaction,
        Err(SolveError::Problems(problems)) => {
            for problem in &problems {
                reporter.problem(problem);
            }
            return Err(ResolveError::Unsatisfiable { problems });
        }
        Err(SolveError::MatchSpec(e)) => return Err(e.into()),
        Err(SolveError::Internal(msg)) => return Err(ResolveError::Internal(msg)),
    };

    let mut resolution = classify(&transaction, ClassifyMode::OBSOLETE_IS_UPGRADE, reporter)?;
    attach_metadata(&mut resolution.installs, &cache)?;

    reporter.info(&format!(
        "{} to install, {} to remove",
        resolution.installs.len(),
        resolution.removes.len()
    ));
    Ok(resolution)
}

/// Fill in the metadata of every install record from the cached index texts.
///
/// # Errors
///
/// Returns [`ResolveError::Internal`] if a record's repository was never
/// cached and [`ResolveError::MetadataExtraction`] if its file name cannot be
/// found in the cached text.
pub fn attach_metadata(installs: &mut [InstallRecord], cache: &RepoTextCache) -> Result<()> {
    for record in installs {
        let text = cache.get(&record.repo).ok_or_else(|| {
            ResolveError::Internal(format!("repository '{}' has no cached index", record.repo))
        })?;
        let metadata =
            locate(text, &record.file_name).map_err(|source| ResolveError::MetadataExtraction {
                repo: record.repo.clone(),
                file: record.file_name.clone(),
                source,
            })?;
        record.metadata = metadata.to_string();
    }
    Ok(())
}

fn read_index(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_index(
    pool: &mut Pool,
    repo: RepoId,
    name: &str,
    text: &str,
    reporter: &dyn Reporter,
) -> Result<()> {
    let count = pool
        .add_repodata(repo, text)
        .map_err(|source| ResolveError::Repodata {
            repo: name.to_string(),
            source,
        })?;
    tracing::debug!("Loaded {count} packages from {name}");
    reporter.repository_loaded(name, count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::LocateError;

    #[test]
    fn test_attach_metadata_copies_raw_object() {
        let mut cache = RepoTextCache::new();
        cache.put(
            "main",
            r#"{"packages": {"foo-1.0.json": {"version": "1.0", "depends": ["bar"]}}}"#.to_string(),
        );
        let mut installs = vec![InstallRecord::new("main", "foo-1.0.json")];

        attach_metadata(&mut installs, &cache).unwrap();
        assert_eq!(
            installs[0].metadata,
            r#"{"version": "1.0", "depends": ["bar"]}"#
        );
    }

    #[test]
    fn test_attach_metadata_missing_key() {
        let mut cache = RepoTextCache::new();
        cache.put("main", r#"{"packages":{}}"#.to_string());
        let mut installs = vec![InstallRecord::new("main", "ghost-1.0.json")];

        match attach_metadata(&mut installs, &cache).unwrap_err() {
            ResolveError::MetadataExtraction { repo, file, source } => {
                assert_eq!(repo, "main");
                assert_eq!(file, "ghost-1.0.json");
                assert!(matches!(source, LocateError::KeyNotFound { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_attach_metadata_uncached_repo() {
        let cache = RepoTextCache::new();
        let mut installs = vec![InstallRecord::new("elsewhere", "x-1.0.json")];
        assert!(matches!(
            attach_metadata(&mut installs, &cache),
            Err(ResolveError::Internal(_))
        ));
    }
}
