//! Serde shapes of a repository index (`repodata.json` style).
//!
//! Only the fields the solver needs are modelled; everything else in a
//! package record is ignored here and survives untouched in the raw text
//! handed back to the application.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File extensions stripped from a file name before deriving identity.
const KNOWN_EXTENSIONS: &[&str] = &[".tar.bz2", ".conda", ".json"];

/// A repository index: package file name to package record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoData {
    /// Package records keyed by file name.
    #[serde(default)]
    pub packages: BTreeMap<String, PackageRecord>,
}

/// The solver-relevant part of one package record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Package name; derived from the file name when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Version string; derived from the file name when absent.
    #[serde(default)]
    pub version: Option<String>,
    /// Build string.
    #[serde(default)]
    pub build: Option<String>,
    /// Build number, used to break ties between builds of one version.
    #[serde(default)]
    pub build_number: u64,
    /// Runtime dependencies as match specifications.
    #[serde(default)]
    pub depends: Vec<String>,
    /// Platform subdirectory (e.g. `linux-64`, `noarch`).
    #[serde(default)]
    pub subdir: Option<String>,
    /// Channel the package was installed from (installed records only).
    #[serde(default)]
    pub channel: Option<String>,
}

impl PackageRecord {
    /// Resolve `(name, version)` for this record.
    ///
    /// Explicit fields win; missing ones are recovered from a
    /// `name-version[-build].ext` file name. Returns `None` when the file
    /// name does not follow that shape.
    ///
    /// # Example
    ///
    /// ```
    /// use depsolve_schema::PackageRecord;
    ///
    /// let record = PackageRecord {
    ///     version: Some("1.0".into()),
    ///     ..Default::default()
    /// };
    /// let (name, version) = record.identity("foo-1.0.json").unwrap();
    /// assert_eq!(name, "foo");
    /// assert_eq!(version, "1.0");
    /// ```
    pub fn identity(&self, file_name: &str) -> Option<(String, String)> {
        if let (Some(name), Some(version)) = (&self.name, &self.version) {
            return Some((name.clone(), version.clone()));
        }

        let stem = strip_extension(file_name);

        if let Some(version) = &self.version {
            let suffix = format!("-{version}");
            let name = match stem.find(&suffix) {
                Some(idx) if idx > 0 => &stem[..idx],
                _ => return None,
            };
            return Some((name.to_string(), version.clone()));
        }

        let (name, version) = split_stem(stem)?;
        Some((
            self.name.clone().unwrap_or_else(|| name.to_string()),
            version.to_string(),
        ))
    }
}

fn strip_extension(file_name: &str) -> &str {
    KNOWN_EXTENSIONS
        .iter()
        .find_map(|ext| file_name.strip_suffix(ext))
        .unwrap_or(file_name)
}

/// Split `name-version-build` or `name-version`, requiring the version to start with a digit.
fn split_stem(stem: &str) -> Option<(&str, &str)> {
    let starts_with_digit = |s: &str| s.chars().next().is_some_and(|c| c.is_ascii_digit());

    let parts: Vec<&str> = stem.rsplitn(3, '-').collect();
    if let [_build, version, name] = parts.as_slice() {
        if starts_with_digit(version) && !name.is_empty() {
            return Some((name, version));
        }
    }

    let (name, version) = stem.rsplit_once('-')?;
    if starts_with_digit(version) && !name.is_empty() {
        Some((name, version))
    } else {
        None
    }
}
