//! Plain-text scope definition files.
//!
//! One path per line. Blank lines and lines starting with `#`, `//`, `-` or
//! `*` are skipped, so a scope list pasted from a markdown audit brief works
//! unchanged. Each remaining line is resolved against the workspace root and
//! checked on its own; a bad line is reported and the rest still load.

use crate::error::AuditError;
use crate::utils::paths::{is_within_directory, make_absolute};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Prefixes that mark a line as commentary
const COMMENT_PREFIXES: [&str; 4] = ["#", "//", "-", "*"];

/// A scope line that was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-indexed line number in the file
    pub line: usize,
    /// Raw line content, trimmed
    pub entry: String,
    /// Why it was rejected
    pub error: AuditError,
}

/// Result of reading a scope file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFileReport {
    /// Absolute paths accepted, in file order
    pub accepted: Vec<PathBuf>,
    /// Lines that could not be used
    pub rejected: Vec<RejectedLine>,
}

/// Meaningful entries of a scope file with their 1-indexed line numbers
#[must_use]
pub fn parse_scope_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| {
            !line.is_empty() && !COMMENT_PREFIXES.iter().any(|p| line.starts_with(p))
        })
        .collect()
}

/// Resolve one entry against the workspace root
///
/// # Errors
///
/// Returns `PathOutsideWorkspace` when the entry escapes `root`, and
/// `PathNotFound` when it does not exist.
pub fn resolve_scope_entry(entry: &str, root: &Path) -> Result<PathBuf, AuditError> {
    let resolved =
        make_absolute(Path::new(entry), root).map_err(|_| AuditError::PathNotFound(entry.into()))?;

    if !is_within_directory(&resolved, root) {
        return Err(AuditError::PathOutsideWorkspace {
            path: resolved,
            root: root.to_path_buf(),
        });
    }
    if !resolved.exists() {
        return Err(AuditError::PathNotFound(resolved));
    }
    Ok(resolved)
}

/// Resolve every entry of already-read scope file content
#[must_use]
pub fn resolve_scope_content(content: &str, root: &Path) -> ScopeFileReport {
    let mut report = ScopeFileReport::default();
    for (line, entry) in parse_scope_lines(content) {
        match resolve_scope_entry(entry, root) {
            Ok(path) => {
                if !report.accepted.contains(&path) {
                    report.accepted.push(path);
                }
            }
            Err(error) => report.rejected.push(RejectedLine {
                line,
                entry: entry.to_string(),
                error,
            }),
        }
    }
    report
}

/// Read and resolve a scope file
///
/// # Errors
///
/// Returns an error only if the file itself cannot be read.
pub fn load_scope_file(path: &Path, root: &Path) -> Result<ScopeFileReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scope file: {}", path.display()))?;
    Ok(resolve_scope_content(&content, root))
}
