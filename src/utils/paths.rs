use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Path of `path` relative to `root` for display, or `path` unchanged when it
/// lies outside `root`
#[must_use]
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Resolve `.` and `..` components without touching the filesystem
///
/// `..` at the root of an absolute path is dropped, as the OS would.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns an error if the parent directories cannot be created
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create parent directories for {}", path.display())
        })?;
    }
    Ok(())
}

/// Expands tilde in path to home directory
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Some(path_str) = path.to_str() else {
        return Ok(path.to_path_buf());
    };
    if path_str == "~" {
        return dirs::home_dir().context("Could not find home directory");
    }
    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().context("Could not find home directory")?;
        return Ok(home.join(rest));
    }
    Ok(path.to_path_buf())
}

/// Makes a path absolute against `base`, expanding `~` and normalizing
/// `.`/`..` lexically
///
/// # Errors
///
/// Returns an error if the home directory is needed but cannot be determined
pub fn make_absolute(path: &Path, base: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path)?;
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };
    Ok(normalize_lexically(&joined))
}

/// Checks if a path is within a base directory
///
/// The lexical check must pass, and the deepest existing ancestor of `path`
/// must still be inside `base` once symlinks are resolved.
#[must_use]
pub fn is_within_directory(path: &Path, base: &Path) -> bool {
    let normalized = normalize_lexically(path);
    let lexical_base = normalize_lexically(base);
    if !normalized.starts_with(&lexical_base) {
        return false;
    }
    let Ok(canonical_base) = base.canonicalize() else {
        return true;
    };
    normalized
        .ancestors()
        .take_while(|ancestor| ancestor.starts_with(&lexical_base))
        .find_map(|ancestor| ancestor.canonicalize().ok())
        .is_none_or(|canonical| canonical.starts_with(canonical_base))
}

/// Workspace root as an absolute, canonical path when it exists
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    let absolute = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to determine current directory")?
            .join(root)
    };
    Ok(absolute
        .canonicalize()
        .unwrap_or_else(|_| normalize_lexically(&absolute)))
}
