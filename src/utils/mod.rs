//! Utility functions and helpers.
//!
//! - Path manipulation (tilde expansion, lexical normalization, display paths)
//! - Directory traversal with ignore patterns
//! - Timestamps
//!
//! # Submodules
//!
//! - [`formatters`]: Output formatting
//! - [`paths`]: Path manipulation

/// Output formatting and colorization
pub mod formatters;
/// Path manipulation and resolution utilities
pub mod paths;

use anyhow::Result;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Walks a directory and returns all file paths that pass the provided filter function.
///
/// Entries rejected by `filter` are pruned, so an ignored directory is never
/// descended into.
///
/// # Errors
/// Returns an error if any entry cannot be accessed.
pub fn walk_dir_filtered<F>(dir: &Path, filter: F, follow_symlinks: bool) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut paths = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| filter(e.path()))
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            paths.push(entry.path().to_path_buf());
        }
    }

    Ok(paths)
}

/// Compile glob patterns, skipping (and logging) invalid ones
#[must_use]
pub fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!(pattern = %p, error = %e, "Ignoring invalid glob pattern");
                None
            }
        })
        .collect()
}

/// Determines if a given path should be ignored
///
/// A pattern matches either the whole path or any single component, so
/// `node_modules` prunes that directory anywhere and `*.t.sol` matches test
/// files by name.
#[must_use]
pub fn should_ignore(path: &Path, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|pattern| {
        pattern.matches_path(path)
            || path
                .components()
                .any(|c| c.as_os_str().to_str().is_some_and(|s| pattern.matches(s)))
    })
}

/// Returns the current timestamp as milliseconds since the Unix epoch.
#[must_use]
pub fn current_timestamp_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn patterns(raw: &[&str]) -> Vec<Pattern> {
        compile_patterns(&raw.iter().map(|s| (*s).to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_should_ignore_component_and_suffix() {
        let ignore = patterns(&["node_modules", "*.t.sol"]);
        assert!(should_ignore(Path::new("/repo/node_modules/x/a.sol"), &ignore));
        assert!(should_ignore(Path::new("/repo/test/Vault.t.sol"), &ignore));
        assert!(!should_ignore(Path::new("/repo/src/Vault.sol"), &ignore));
    }

    #[test]
    fn test_invalid_patterns_are_skipped() {
        let compiled = patterns(&["[", "*.sol"]);
        assert_eq!(compiled.len(), 1);
    }

    #[test]
    fn test_walk_prunes_ignored_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::create_dir_all(temp.path().join("lib/dep")).unwrap();
        fs::write(temp.path().join("src/a.sol"), "").unwrap();
        fs::write(temp.path().join("lib/dep/b.sol"), "").unwrap();

        let ignore = patterns(&["lib"]);
        let files = walk_dir_filtered(temp.path(), |p| !should_ignore(p, &ignore), false).unwrap();

        assert_eq!(files, vec![temp.path().join("src/a.sol")]);
    }

    #[test]
    fn test_timestamp_is_positive() {
        assert!(current_timestamp_millis() > 0);
    }
}
