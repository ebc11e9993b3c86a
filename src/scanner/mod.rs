//! Filtering of remote file trees.
//!
//! GitHub's recursive tree listing of a repository is reduced to a
//! shallow, dependency-free snapshot before it is shown to the auditor.

use serde::Deserialize;
use tracing::debug;

/// Configuration for tree filtering.
#[derive(Debug, Clone)]
pub struct TreeFilterConfig {
    /// Substrings that exclude a path (e.g. ["node_modules", ".git"])
    pub excludes: Vec<String>,
    /// Maximum number of `/`-separated segments in a kept path
    pub max_depth: usize,
    /// Maximum number of entries to keep
    pub max_entries: Option<usize>,
}

impl Default for TreeFilterConfig {
    fn default() -> Self {
        Self {
            excludes: vec!["node_modules", ".git"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_depth: 2,
            max_entries: None,
        }
    }
}

impl From<&crate::config::TreeConfig> for TreeFilterConfig {
    fn from(config: &crate::config::TreeConfig) -> Self {
        Self {
            excludes: config.excludes.clone(),
            max_depth: config.max_depth,
            max_entries: config.max_entries,
        }
    }
}

/// One entry of a `git/trees` API response.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
}

/// Reduces tree listings to the paths worth showing the auditor.
#[derive(Debug, Clone, Default)]
pub struct TreeFilter {
    config: TreeFilterConfig,
}

impl TreeFilter {
    pub fn new(config: TreeFilterConfig) -> Self {
        Self { config }
    }

    /// Check if a path passes the exclude and depth rules.
    pub fn matches(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }

        if self.is_excluded(path) {
            return false;
        }

        path.split('/').count() <= self.config.max_depth
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.config
            .excludes
            .iter()
            .any(|pattern| path.contains(pattern.as_str()))
    }

    /// Filter entries, keeping tree order.
    pub fn filter<'a>(&self, entries: &'a [TreeEntry]) -> Vec<&'a str> {
        let mut kept: Vec<&str> = entries
            .iter()
            .map(|e| e.path.as_str())
            .filter(|p| self.matches(p))
            .collect();

        if let Some(max) = self.config.max_entries {
            if kept.len() > max {
                debug!("Truncating file tree from {} to {} entries", kept.len(), max);
                kept.truncate(max);
            }
        }

        kept
    }

    /// Render the filtered tree as newline-separated paths.
    pub fn render(&self, entries: &[TreeEntry]) -> String {
        self.filter(entries).join("\n")
    }
}
