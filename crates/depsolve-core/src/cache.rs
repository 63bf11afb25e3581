//! Verbatim repository index text, keyed by repository name.

use std::collections::HashMap;

/// Raw JSON text of every repository loaded for one resolve call.
///
/// Text is stored once and only handed out as shared slices afterwards.
#[derive(Debug, Default)]
pub struct RepoTextCache {
    texts: HashMap<String, String>,
}

impl RepoTextCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the text for `repo`.
    ///
    /// Returns `false` (and leaves the stored text alone) when the repository
    /// was already cached.
    pub fn put(&mut self, repo: impl Into<String>, text: String) -> bool {
        let repo = repo.into();
        if self.texts.contains_key(&repo) {
            tracing::warn!("Repository '{repo}' cached twice, keeping the first text");
            return false;
        }
        self.texts.insert(repo, text);
        true
    }

    /// The text for `repo`, or `None` if it was never cached.
    pub fn get(&self, repo: &str) -> Option<&str> {
        self.texts.get(repo).map(String::as_str)
    }

    /// Number of cached repositories.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
