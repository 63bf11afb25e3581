//! `PubGrub` adapter over the solvable pool.
//!
//! Implements the `DependencyProvider` trait so the `PubGrub` solver can
//! query candidate versions and dependency constraints from a [`Pool`].
//! Candidate lists are prepared by the solver (erase/lock/priority filtering
//! already applied) and are stored in preference order.

use super::pool::{Pool, SolvableId};
use crate::matchspec::MatchSpec;
use pubgrub::range::Range;
use pubgrub::solver::{Dependencies, DependencyConstraints, DependencyProvider};
use pubgrub::version::SemanticVersion;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Package identity as seen by `PubGrub`.
///
/// `Root` is a synthetic package whose dependencies are the submitted jobs
/// plus the keep requirements for installed packages.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum PkgId {
    /// The request itself.
    Root,
    /// A real package name.
    Named(String),
}

impl fmt::Display for PkgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "the request"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// One selectable version of a package and the solvable backing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Version offered to the solver.
    pub version: SemanticVersion,
    /// Solvable installed if this version is picked.
    pub solvable: SolvableId,
}

/// Adapter that provides pool contents to the `PubGrub` solver.
#[derive(Debug)]
pub struct PoolDependencyProvider<'p> {
    pool: &'p Pool,
    candidates: HashMap<String, Vec<Candidate>>,
    root: DependencyConstraints<PkgId, SemanticVersion>,
}

impl<'p> PoolDependencyProvider<'p> {
    /// Create a provider from prepared candidate lists and root requirements.
    pub fn new(
        pool: &'p Pool,
        candidates: HashMap<String, Vec<Candidate>>,
        root: DependencyConstraints<PkgId, SemanticVersion>,
    ) -> Self {
        Self {
            pool,
            candidates,
            root,
        }
    }

    /// The solvable offered for `name` at `version`.
    pub fn candidate(&self, name: &str, version: &SemanticVersion) -> Option<SolvableId> {
        self.candidates
            .get(name)?
            .iter()
            .find(|c| &c.version == version)
            .map(|c| c.solvable)
    }

    /// Dependency constraints of one solvable; `None` marks it unusable.
    fn dependencies_of(&self, id: SolvableId) -> Option<DependencyConstraints<PkgId, SemanticVersion>> {
        let solvable = self.pool.solvable(id);
        let mut deps: DependencyConstraints<PkgId, SemanticVersion> =
            DependencyConstraints::default();

        for dep in &solvable.depends {
            let spec = match MatchSpec::parse(dep) {
                Ok(spec) => spec,
                Err(e) => {
                    tracing::warn!("{} {}: unusable dependency: {e}", solvable.name, solvable.version);
                    return None;
                }
            };
            if spec.name == solvable.name {
                continue;
            }

            let key = PkgId::Named(spec.name.clone());
            let range = match deps.get(&key) {
                Some(existing) => existing.intersection(&spec.range),
                None => spec.range,
            };
            if range == Range::none() {
                tracing::debug!(
                    "{} {}: dependency on '{}' can never be met",
                    solvable.name,
                    solvable.version,
                    spec.name
                );
                return None;
            }
            deps.insert(key, range);
        }

        Some(deps)
    }
}

impl DependencyProvider<PkgId, SemanticVersion> for PoolDependencyProvider<'_> {
    fn choose_package_version<T: Borrow<PkgId>, U: Borrow<Range<SemanticVersion>>>(
        &self,
        potential_packages: impl Iterator<Item = (T, U)>,
    ) -> Result<(T, Option<SemanticVersion>), Box<dyn Error>> {
        // Pick the first package and its most preferred version in range
        let (pkg, range) = potential_packages
            .into_iter()
            .next()
            .ok_or("solver offered no package to choose")?;
        let range: &Range<SemanticVersion> = range.borrow();

        let version = match pkg.borrow() {
            PkgId::Root => Some(SemanticVersion::zero()).filter(|v| range.contains(v)),
            PkgId::Named(name) => self.candidates.get(name).and_then(|candidates| {
                candidates
                    .iter()
                    .find(|c| range.contains(&c.version))
                    .map(|c| c.version)
            }),
        };

        Ok((pkg, version))
    }

    fn get_dependencies(
        &self,
        package: &PkgId,
        version: &SemanticVersion,
    ) -> Result<Dependencies<PkgId, SemanticVersion>, Box<dyn Error>> {
        match package {
            PkgId::Root => Ok(Dependencies::Known(self.root.clone())),
            PkgId::Named(name) => Ok(self
                .candidate(name, version)
                .and_then(|id| self.dependencies_of(id))
                .map_or(Dependencies::Unknown, Dependencies::Known)),
        }
    }
}
