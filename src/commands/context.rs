use anyhow::{Context, Result};
use std::path::Path;

use crate::AuditContext;
use crate::error::AuditError;
use crate::extract::SymbolExtractor;
use crate::session::ReviewSession;
use crate::utils::paths::{display_relative, make_absolute};

/// Trait providing common operations for command modules
pub trait CommandContext {
    /// Resolves a file argument to the key of a tracked file
    ///
    /// The reference may be absolute, relative to the workspace root, or
    /// relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::FileNotTracked` if no tracked file matches
    fn resolve_tracked_file<E: SymbolExtractor>(
        &self,
        session: &ReviewSession<E>,
        reference: &str,
    ) -> Result<String>;

    /// Path for display, relative to the workspace root when possible
    fn display_path(&self, path: &Path) -> String;

    /// Asks for confirmation on stdin; always `true` when non-interactive
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

impl CommandContext for AuditContext {
    fn resolve_tracked_file<E: SymbolExtractor>(
        &self,
        session: &ReviewSession<E>,
        reference: &str,
    ) -> Result<String> {
        if let Some(file) = session.find_file(reference) {
            return Ok(file.file_path.clone());
        }

        let cwd = std::env::current_dir().context("Could not determine current directory")?;
        let absolute = make_absolute(Path::new(reference), &cwd)?;
        session
            .find_file(&absolute.to_string_lossy())
            .map(|f| f.file_path.clone())
            .ok_or_else(|| AuditError::FileNotTracked(reference.to_string()).into())
    }

    fn display_path(&self, path: &Path) -> String {
        display_relative(path, &self.workspace_root)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.non_interactive {
            return Ok(true);
        }

        eprint!("{prompt} [y/N] ");
        let mut answer = String::new();
        std::io::stdin()
            .read_line(&mut answer)
            .context("Failed to read confirmation")?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{StaticExtractor, SymbolCandidate, SymbolKind};
    use crate::store::StateStore;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let file = root.join("src/Vault.sol");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "contract Vault {}").unwrap();

        let ctx = AuditContext::new_explicit(root.clone(), root.join("config")).unwrap();
        let extractor = StaticExtractor::new().with(
            &file,
            vec![SymbolCandidate::new("deposit", SymbolKind::Function, 1, 4)],
        );
        let store = StateStore::open(ctx.state_path(), root.clone()).unwrap();
        let mut session = ReviewSession::new(store, extractor);
        session.add_to_scope(&file).unwrap();

        let key = file.to_string_lossy().into_owned();
        assert_eq!(ctx.resolve_tracked_file(&session, "src/Vault.sol").unwrap(), key);
        assert_eq!(ctx.resolve_tracked_file(&session, &key).unwrap(), key);
        assert!(ctx.resolve_tracked_file(&session, "src/Missing.sol").is_err());
        assert_eq!(ctx.display_path(&file), "src/Vault.sol");
    }

    #[test]
    fn test_confirm_non_interactive() {
        let temp = TempDir::new().unwrap();
        let ctx =
            AuditContext::new_explicit(temp.path().to_path_buf(), temp.path().join("config"))
                .unwrap();
        assert!(ctx.confirm("Really?").unwrap());
    }
}
