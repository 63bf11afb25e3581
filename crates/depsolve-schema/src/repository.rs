//! Repository sources taking part in a resolve.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A repository index taking part in one resolve call.
///
/// # Example
///
/// ```
/// use depsolve_schema::RepositorySource;
///
/// let repo: RepositorySource = "main=/srv/main.json:10".parse().unwrap();
/// assert_eq!(repo.name, "main");
/// assert_eq!(repo.priority, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySource {
    /// Unique repository name (the channel).
    pub name: String,
    /// Path of the JSON index file.
    pub path: PathBuf,
    /// Higher priority wins when several repositories offer a package.
    #[serde(default)]
    pub priority: i32,
}

impl RepositorySource {
    /// Create a new repository source.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, priority: i32) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            priority,
        }
    }
}

impl std::str::FromStr for RepositorySource {
    type Err = String;

    /// Parse `NAME=PATH[:PRIORITY]`.
    ///
    /// The priority suffix is only taken when it parses as an integer, so
    /// paths containing `:` still work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rest) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid repository '{s}': expected NAME=PATH[:PRIORITY]"))?;
        if name.is_empty() || rest.is_empty() {
            return Err(format!(
                "Invalid repository '{s}': name and path must not be empty"
            ));
        }

        let (path, priority) = match rest.rsplit_once(':') {
            Some((path, prio)) if !path.is_empty() => match prio.parse::<i32>() {
                Ok(p) => (path, p),
                Err(_) => (rest, 0),
            },
            _ => (rest, 0),
        };

        Ok(Self::new(name, path, priority))
    }
}
