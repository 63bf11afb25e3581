//! Dependency solver: turns jobs against a [`Pool`] into a [`Transaction`].
//!
//! Jobs are lowered onto the requirements of a synthetic root package and
//! handed to `PubGrub`. Installed packages no job mentions are kept by an
//! extra root requirement, so the solution describes the complete target
//! package set rather than just the requested packages.

mod flags;
mod pool;
mod provider;
mod transaction;

pub use flags::{ALLOW_DOWNGRADE, FAVOR_INSTALLED, STRICT_REPO_PRIORITY, SolverFlags};
pub use pool::{Pool, Repo, RepoId, Solvable, SolvableId};
pub use provider::{Candidate, PkgId, PoolDependencyProvider};
pub use transaction::Transaction;

use crate::matchspec::{MatchSpec, MatchSpecError};
use depsolve_schema::{JobAction, SolveJob};
use pubgrub::error::PubGrubError;
use pubgrub::range::Range;
use pubgrub::report::{DefaultStringReporter, Reporter as _};
use pubgrub::solver::DependencyConstraints;
use pubgrub::version::SemanticVersion;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Why a solve produced no transaction.
#[derive(Error, Debug)]
pub enum SolveError {
    /// The jobs cannot be satisfied; one description per problem.
    #[error("{} problem(s) found", .0.len())]
    Problems(Vec<String>),

    /// A job's match specification is invalid.
    #[error(transparent)]
    MatchSpec(#[from] MatchSpecError),

    /// The solver itself failed.
    #[error("Solver failure: {0}")]
    Internal(String),
}

/// Root requirement for one name and the job texts that produced it.
struct Requirement {
    name: String,
    range: Range<SemanticVersion>,
    jobs: Vec<String>,
}

/// A solver bound to one pool.
#[derive(Debug)]
pub struct Solver<'p> {
    pool: &'p Pool,
    flags: SolverFlags,
}

impl<'p> Solver<'p> {
    /// Create a solver with default flags.
    pub fn new(pool: &'p Pool) -> Self {
        Self {
            pool,
            flags: SolverFlags::default(),
        }
    }

    /// Apply a solver option; unknown ids are ignored.
    pub fn set_flag(&mut self, id: u32, value: i32) -> bool {
        self.flags.set(id, value)
    }

    /// Current flags.
    pub fn flags(&self) -> SolverFlags {
        self.flags
    }

    /// Solve `jobs` against the pool.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::Problems`] listing every problem found when the
    /// jobs cannot be satisfied.
    pub fn solve(&self, jobs: &[SolveJob]) -> Result<Transaction<'p>, SolveError> {
        let mut specs = Vec::with_capacity(jobs.len());
        for job in jobs {
            specs.push((job, MatchSpec::parse(&job.spec)?));
        }

        let installed = self.installed_by_name();
        let mut erased = HashSet::new();
        let mut locked: HashMap<String, Option<SolvableId>> = HashMap::new();
        let mut updates = HashSet::new();
        let mut requested = Vec::new();

        for (job, spec) in specs {
            match job.action() {
                JobAction::Erase => match installed.get(spec.name.as_str()) {
                    Some(&id) if spec.contains(&self.pool.solvable(id).semver) => {
                        tracing::debug!("Erasing {}", spec.name);
                        erased.insert(spec.name);
                    }
                    _ => tracing::debug!("{job}: nothing installed matches"),
                },
                JobAction::Lock => {
                    let id = installed.get(spec.name.as_str()).copied();
                    locked.insert(spec.name, id);
                }
                JobAction::Update => {
                    updates.insert(spec.name.clone());
                    requested.push((job, spec));
                }
                JobAction::Install => requested.push((job, spec)),
            }
        }

        let candidates = self.candidates(&erased, &locked, &updates);
        let mut problems = Vec::new();
        let mut requirements: Vec<Requirement> = Vec::new();

        for (job, spec) in requested {
            let available = candidates
                .get(&spec.name)
                .is_some_and(|list| list.iter().any(|c| spec.contains(&c.version)));
            if !available {
                if job.is_weak() {
                    tracing::debug!("Dropping weak job '{job}': nothing provides it");
                } else if erased.contains(&spec.name) {
                    problems.push(format!("{job} conflicts with erasing {}", spec.name));
                } else {
                    problems.push(format!("nothing provides requested {spec}"));
                }
                continue;
            }

            match requirements.iter_mut().find(|r| r.name == spec.name) {
                Some(existing) => {
                    existing.range = existing.range.intersection(&spec.range);
                    existing.jobs.push(job.spec.clone());
                }
                None => requirements.push(Requirement {
                    name: spec.name.clone(),
                    range: spec.range,
                    jobs: vec![job.spec.clone()],
                }),
            }
        }

        let mut root = DependencyConstraints::default();
        for requirement in requirements {
            if requirement.range == Range::none() {
                problems.push(format!(
                    "conflicting requests: {}",
                    requirement.jobs.join(", ")
                ));
                continue;
            }
            root.insert(PkgId::Named(requirement.name), requirement.range);
        }

        if !problems.is_empty() {
            return Err(SolveError::Problems(problems));
        }

        for (name, id) in &locked {
            if let Some(id) = id {
                let pinned = Range::exact(self.pool.solvable(*id).semver);
                let key = PkgId::Named(name.clone());
                let range = root
                    .get(&key)
                    .map_or_else(|| pinned.clone(), |r| r.intersection(&pinned));
                root.insert(key, range);
            }
        }

        // Keep every installed package no job talks about.
        for (&name, &id) in &installed {
            let key = PkgId::Named(name.to_string());
            if erased.contains(name) || root.contains_key(&key) {
                continue;
            }
            let range = if self.flags.allow_downgrade {
                Range::any()
            } else {
                Range::higher_than(self.pool.solvable(id).semver)
            };
            root.insert(key, range);
        }

        tracing::debug!("Solving with {} root requirement(s)", root.len());
        let provider = PoolDependencyProvider::new(self.pool, candidates, root);
        let solution = match pubgrub::solver::resolve(&provider, PkgId::Root, SemanticVersion::zero()) {
            Ok(solution) => solution,
            Err(PubGrubError::NoSolution(mut tree)) => {
                tree.collapse_no_versions();
                return Err(SolveError::Problems(vec![DefaultStringReporter::report(&tree)]));
            }
            Err(e) => return Err(SolveError::Internal(e.to_string())),
        };

        let mut chosen = BTreeMap::new();
        for (pkg, version) in solution {
            if let PkgId::Named(name) = pkg {
                let id = provider.candidate(&name, &version).ok_or_else(|| {
                    SolveError::Internal(format!("no candidate for {name} {version}"))
                })?;
                chosen.insert(name, id);
            }
        }

        let transaction = Transaction::new(self.pool, &chosen);
        tracing::debug!("Transaction has {} step(s)", transaction.len());
        Ok(transaction)
    }

    /// First installed solvable of every installed name.
    fn installed_by_name(&self) -> HashMap<&'p str, SolvableId> {
        let mut installed = HashMap::new();
        for &id in self.pool.installed_solvables() {
            installed
                .entry(self.pool.solvable(id).name.as_str())
                .or_insert(id);
        }
        installed
    }

    /// Candidate lists per name, most preferred first.
    fn candidates(
        &self,
        erased: &HashSet<String>,
        locked: &HashMap<String, Option<SolvableId>>,
        updates: &HashSet<String>,
    ) -> HashMap<String, Vec<Candidate>> {
        let mut out = HashMap::new();

        for name in self.pool.names() {
            if erased.contains(name) {
                continue;
            }
            let ids = match locked.get(name) {
                Some(Some(id)) => vec![*id],
                Some(None) => continue,
                None => self.eligible(name),
            };

            // Best build per version.
            let mut best: BTreeMap<SemanticVersion, SolvableId> = BTreeMap::new();
            for id in ids {
                let version = self.pool.solvable(id).semver;
                if let Some(&current) = best.get(&version) {
                    let (a, b) = (self.pool.solvable(id), self.pool.solvable(current));
                    if a.version != b.version {
                        tracing::warn!(
                            "{name}: versions '{}' and '{}' compare equal; only one is considered",
                            a.version,
                            b.version
                        );
                    }
                    if !self.prefer(id, current) {
                        continue;
                    }
                }
                best.insert(version, id);
            }

            let mut list: Vec<Candidate> = best
                .into_iter()
                .rev()
                .map(|(version, solvable)| Candidate { version, solvable })
                .collect();

            if self.flags.favor_installed && !updates.contains(name) {
                if let Some(pos) = list.iter().position(|c| self.pool.is_installed(c.solvable)) {
                    let installed = list.remove(pos);
                    list.insert(0, installed);
                }
            }

            out.insert(name.to_string(), list);
        }

        out
    }

    /// Solvables of `name` the solver may pick, honoring strict repository priority.
    fn eligible(&self, name: &str) -> Vec<SolvableId> {
        let all = self.pool.whatprovides(name);
        if !self.flags.strict_repo_priority {
            return all.to_vec();
        }

        let top = all
            .iter()
            .filter(|&&id| !self.pool.is_installed(id))
            .map(|&id| self.pool.repo(self.pool.solvable(id).repo).priority)
            .max();
        all.iter()
            .copied()
            .filter(|&id| {
                self.pool.is_installed(id)
                    || Some(self.pool.repo(self.pool.solvable(id).repo).priority) == top
            })
            .collect()
    }

    /// Whether `a` should be picked over `b` for the same version.
    fn prefer(&self, a: SolvableId, b: SolvableId) -> bool {
        let key = |id: SolvableId| {
            let solvable = self.pool.solvable(id);
            (
                self.pool.is_installed(id),
                self.pool.repo(solvable.repo).priority,
                solvable.build_number,
            )
        };
        key(a) > key(b) || (key(a) == key(b) && a < b)
    }
}
