//! Scope inclusion and exclusion algebra.
//!
//! A path is in scope when it equals, or sits below, one of the scope paths
//! and is not listed as excluded. Exclusion is file-grained: excluding
//! `/repo/src/a.sol` under an in-scope `/repo/src` hides that one file and
//! nothing else. Exclusion wins over any number of in-scope ancestors.
//!
//! Paths are compared component-wise through [`Path`], so `/repo/src` covers
//! `/repo/src/a.sol` but not `/repo/srcx/a.sol`, and a trailing separator
//! does not make two entries different.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scope and exclusion path lists, persisted as `scopePaths` and `excludedPaths`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSet {
    /// Files and folders marked in scope, unique, in insertion order
    pub scope_paths: Vec<String>,
    /// Files excluded beneath an in-scope folder, unique
    pub excluded_paths: Vec<String>,
}

fn same_path(a: &str, b: &str) -> bool {
    Path::new(a) == Path::new(b)
}

impl ScopeSet {
    /// Create an empty scope set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` is listed as excluded
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths.iter().any(|p| same_path(p, path))
    }

    /// Whether `path` is an exact scope path entry
    #[must_use]
    pub fn is_scope_path(&self, path: &str) -> bool {
        self.scope_paths.iter().any(|p| same_path(p, path))
    }

    /// Whether some scope path equals `path` or is one of its ancestors
    #[must_use]
    pub fn is_covered(&self, path: &str) -> bool {
        let path = Path::new(path);
        self.scope_paths.iter().any(|scope| path.starts_with(scope))
    }

    /// Whether some scope path is a strict ancestor of `path`
    #[must_use]
    pub fn is_covered_by_ancestor(&self, path: &str) -> bool {
        let candidate = Path::new(path);
        self.scope_paths
            .iter()
            .any(|scope| candidate.starts_with(scope) && !same_path(scope, path))
    }

    /// Inclusion query: exclusion first, then coverage
    #[must_use]
    pub fn is_in_scope(&self, path: &str) -> bool {
        !self.is_excluded(path) && self.is_covered(path)
    }

    /// Bring `path` into scope
    ///
    /// Re-adding an excluded path lifts the exclusion. The path is only
    /// appended to the scope paths when it is still not in scope afterwards,
    /// so adding a file below an in-scope folder does not grow the list.
    ///
    /// Returns `true` if anything changed.
    pub fn add_scope_path(&mut self, path: &str) -> bool {
        let mut changed = self.remove_excluded_path(path);
        if !self.is_in_scope(path) {
            self.scope_paths.push(path.to_string());
            changed = true;
        }
        changed
    }

    /// Delete an exact scope path entry
    ///
    /// Returns `true` if the entry existed.
    pub fn remove_scope_path(&mut self, path: &str) -> bool {
        let before = self.scope_paths.len();
        self.scope_paths.retain(|p| !same_path(p, path));
        self.scope_paths.len() != before
    }

    /// Exclude a single file
    ///
    /// A path cannot be both a whole scope entry and excluded, so an exact
    /// scope entry for it is removed. Returns `true` if anything changed.
    pub fn add_excluded_path(&mut self, path: &str) -> bool {
        let removed_scope = self.remove_scope_path(path);
        if self.is_excluded(path) {
            return removed_scope;
        }
        self.excluded_paths.push(path.to_string());
        true
    }

    /// Lift an exclusion
    ///
    /// Returns `true` if the exclusion existed.
    pub fn remove_excluded_path(&mut self, path: &str) -> bool {
        let before = self.excluded_paths.len();
        self.excluded_paths.retain(|p| !same_path(p, path));
        self.excluded_paths.len() != before
    }

    /// Whether nothing is in scope
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scope_paths.is_empty()
    }

    /// Drop every scope and exclusion entry
    pub fn clear(&mut self) {
        self.scope_paths.clear();
        self.excluded_paths.clear();
    }
}
