//! Request files (`depsolve.toml`) describing a resolve.
//!
//! ```toml
//! installed = "installed.json"
//! jobs = ["install numpy >=1.20", "remove pandas"]
//! update = false
//! quiet = false
//!
//! [[repository]]
//! name = "main"
//! path = "main.json"
//! priority = 10
//!
//! [[option]]
//! id = 19
//! value = 1
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use crate::resolve::ResolveRequest;
use anyhow::{Context, Result};
use depsolve_schema::{JobFlags, RepositorySource, SolverOption};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequestFile {
    #[serde(default)]
    installed: Option<PathBuf>,
    #[serde(default)]
    jobs: Vec<String>,
    #[serde(default)]
    update: bool,
    #[serde(default)]
    weak: bool,
    #[serde(default)]
    quiet: bool,
    #[serde(default, rename = "repository")]
    repositories: Vec<RepositorySource>,
    #[serde(default, rename = "option")]
    options: Vec<SolverOption>,
}

impl ResolveRequest {
    /// Parse a request from TOML text, resolving relative paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid request file.
    pub fn from_toml(text: &str, base: &Path) -> Result<Self> {
        let file: RequestFile = toml::from_str(text).context("Failed to parse request file")?;

        let mut job_flags = if file.update {
            JobFlags::UPDATE
        } else {
            JobFlags::INSTALL
        };
        if file.weak {
            job_flags = job_flags | JobFlags::WEAK;
        }

        Ok(Self {
            repositories: file
                .repositories
                .into_iter()
                .map(|repo| RepositorySource {
                    path: base.join(&repo.path),
                    ..repo
                })
                .collect(),
            installed: file.installed.map(|path| base.join(path)),
            jobs: file.jobs,
            job_flags,
            options: file.options,
            quiet: file.quiet,
        })
    }

    /// Load a request file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&content, base)
            .with_context(|| format!("Invalid request file {}", path.display()))
    }
}
