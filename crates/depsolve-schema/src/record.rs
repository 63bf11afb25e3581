//! Install and remove records produced by a resolve call.

use serde::{Deserialize, Serialize};

/// A package the application has to install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    /// Repository the package comes from.
    pub repo: String,
    /// Index file name of the package (its key under `"packages"`).
    pub file_name: String,
    /// Verbatim metadata object from the repository index.
    ///
    /// Empty until the resolver attaches it after classification.
    pub metadata: String,
}

impl InstallRecord {
    /// Create a record with no metadata attached yet.
    pub fn new(repo: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            file_name: file_name.into(),
            metadata: String::new(),
        }
    }

    /// Whether the metadata has been attached.
    pub fn has_metadata(&self) -> bool {
        !self.metadata.is_empty()
    }
}

/// A package the application has to remove.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoveRecord {
    /// Repository the installed package is recorded in.
    pub repo: String,
    /// Index file name identifying the installed artifact.
    pub file_name: String,
}

impl RemoveRecord {
    /// Create a new remove record.
    pub fn new(repo: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            file_name: file_name.into(),
        }
    }
}

/// Outcome of a successful resolve: what to install and what to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Packages to install, in transaction order.
    pub installs: Vec<InstallRecord>,
    /// Packages to remove, in transaction order.
    pub removes: Vec<RemoveRecord>,
}

impl Resolution {
    /// Whether the resolve changed nothing.
    pub fn is_empty(&self) -> bool {
        self.installs.is_empty() && self.removes.is_empty()
    }
}
