//! The solvable pool: every package version known to one solve.

use crate::matchspec::parse_version;
use depsolve_schema::RepoData;
use pubgrub::version::SemanticVersion;
use std::collections::HashMap;

/// Index of a solvable inside its [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolvableId(pub u32);

impl std::fmt::Display for SolvableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a repository inside its [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepoId(pub u32);

/// A repository registered with the pool.
#[derive(Debug, Clone)]
pub struct Repo {
    /// Repository name.
    pub name: String,
    /// Priority; higher wins.
    pub priority: i32,
    /// Solvables loaded from this repository, in load order.
    pub solvables: Vec<SolvableId>,
}

/// One package build as the solver sees it.
#[derive(Debug, Clone)]
pub struct Solvable {
    /// Owning repository.
    pub repo: RepoId,
    /// Package name.
    pub name: String,
    /// Version as written in the index.
    pub version: String,
    /// Version as compared by the solver.
    pub semver: SemanticVersion,
    /// Build string (may be empty).
    pub build: String,
    /// Build number; higher wins between builds of one version.
    pub build_number: u64,
    /// Dependencies as match specifications.
    pub depends: Vec<String>,
    /// Platform subdirectory, if recorded.
    pub subdir: Option<String>,
    /// Channel recorded in the package metadata, if any.
    pub channel: Option<String>,
    /// Index file name; the key under `"packages"`.
    pub media_file: String,
}

/// Solver context for a single resolve: repositories, solvables and the
/// installed-repository designation.
#[derive(Debug, Default)]
pub struct Pool {
    repos: Vec<Repo>,
    solvables: Vec<Solvable>,
    by_name: HashMap<String, Vec<SolvableId>>,
    installed: Option<RepoId>,
}

impl Pool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository.
    pub fn add_repo(&mut self, name: impl Into<String>, priority: i32) -> RepoId {
        let id = RepoId(self.repos.len() as u32);
        self.repos.push(Repo {
            name: name.into(),
            priority,
            solvables: Vec::new(),
        });
        id
    }

    /// Mark `repo` as the installed package set.
    pub fn set_installed(&mut self, repo: RepoId) {
        self.installed = Some(repo);
    }

    /// The installed repository, if any.
    pub fn installed(&self) -> Option<RepoId> {
        self.installed
    }

    /// Whether `id` belongs to the installed repository.
    pub fn is_installed(&self, id: SolvableId) -> bool {
        self.installed
            .is_some_and(|repo| self.solvables[id.0 as usize].repo == repo)
    }

    /// Load a repository index into `repo`, returning the number of solvables added.
    ///
    /// Records whose name or version cannot be determined are skipped with a
    /// warning; they stay reachable in the raw text but are never solved for.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the text is not a repository index.
    pub fn add_repodata(&mut self, repo: RepoId, json: &str) -> Result<usize, serde_json::Error> {
        let data: RepoData = serde_json::from_str(json)?;
        let mut added = 0;

        for (file_name, record) in data.packages {
            let Some((name, version)) = record.identity(&file_name) else {
                tracing::warn!(
                    "Skipping '{file_name}' in {}: cannot determine name and version",
                    self.repos[repo.0 as usize].name
                );
                continue;
            };
            let Some(semver) = parse_version(&version) else {
                tracing::warn!("Skipping '{file_name}': unparseable version '{version}'");
                continue;
            };

            let id = SolvableId(self.solvables.len() as u32);
            tracing::trace!("{id} {name} {version} ({file_name})");
            self.by_name.entry(name.clone()).or_default().push(id);
            self.repos[repo.0 as usize].solvables.push(id);
            self.solvables.push(Solvable {
                repo,
                name,
                version,
                semver,
                build: record.build.unwrap_or_default(),
                build_number: record.build_number,
                depends: record.depends,
                subdir: record.subdir,
                channel: record.channel,
                media_file: file_name,
            });
            added += 1;
        }

        Ok(added)
    }

    /// Repository by id.
    pub fn repo(&self, id: RepoId) -> &Repo {
        &self.repos[id.0 as usize]
    }

    /// Solvable by id, if it exists.
    pub fn get(&self, id: SolvableId) -> Option<&Solvable> {
        self.solvables.get(id.0 as usize)
    }

    /// Solvable by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not handed out by this pool.
    pub fn solvable(&self, id: SolvableId) -> &Solvable {
        &self.solvables[id.0 as usize]
    }

    /// Name of the repository `id` came from.
    pub fn repo_name(&self, id: SolvableId) -> &str {
        &self.repo(self.solvable(id).repo).name
    }

    /// Vendor of a solvable: its recorded channel, else its repository for
    /// non-installed packages.
    pub fn vendor(&self, id: SolvableId) -> Option<&str> {
        let solvable = self.solvable(id);
        match &solvable.channel {
            Some(channel) => Some(channel.as_str()),
            None if !self.is_installed(id) => Some(self.repo_name(id)),
            None => None,
        }
    }

    /// Every solvable carrying `name`, in load order.
    pub fn whatprovides(&self, name: &str) -> &[SolvableId] {
        self.by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every package name in the pool.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Solvables of the installed repository, in load order.
    pub fn installed_solvables(&self) -> &[SolvableId] {
        self.installed
            .map(|repo| self.repo(repo).solvables.as_slice())
            .unwrap_or_default()
    }

    /// Total number of solvables.
    pub fn len(&self) -> usize {
        self.solvables.len()
    }

    /// Whether the pool holds no solvables.
    pub fn is_empty(&self) -> bool {
        self.solvables.is_empty()
    }
}
