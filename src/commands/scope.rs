use crate::AuditContext;
use crate::commands::context::CommandContext;
use crate::commands::print_sync_report;
use crate::output;
use crate::session::SyncReport;
use crate::store::ScopeRemoval;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Add files or folders to the scope and sync them
///
/// Every path is attempted and the state saved before rejections are
/// reported as an error.
///
/// # Errors
///
/// Returns an error if a path is outside the workspace or missing, a
/// folder cannot be walked, or the state cannot be saved
pub fn add(ctx: &AuditContext, paths: &[PathBuf]) -> Result<()> {
    let mut session = ctx.open_session()?;
    let mut total = SyncReport::default();
    let mut rejected = 0usize;

    for path in paths {
        match session.add_to_scope(path) {
            Ok(report) => {
                output::action("added", &path.display().to_string());
                total.merge(&report);
            }
            Err(e) => {
                output::error(&format!("{}: {e}", path.display()));
                rejected += 1;
            }
        }
    }

    session.save_and_wait()?;
    if total.files > 0 || total.failed > 0 {
        print_sync_report("synced", &total);
    }

    if rejected > 0 {
        anyhow::bail!("{rejected} path(s) could not be added");
    }
    Ok(())
}

/// Remove files or folders from the scope
///
/// # Errors
///
/// Returns an error if a path cannot be resolved or the state cannot be saved
pub fn remove(ctx: &AuditContext, paths: &[PathBuf]) -> Result<()> {
    let mut session = ctx.open_session()?;

    for path in paths {
        let shown = path.display().to_string();
        match session.remove_from_scope(path)? {
            ScopeRemoval::RemovedEntry { dropped } => {
                output::action("removed", &shown);
                for file in dropped {
                    output::verbose(&format!(
                        "  dropped {}",
                        ctx.display_path(Path::new(&file))
                    ));
                }
            }
            ScopeRemoval::Excluded => output::action("excluded", &shown),
            ScopeRemoval::NotInScope => output::warning(&format!("{shown} is not in scope")),
        }
    }

    session.save_and_wait()
}

/// Load scope entries from a scope definition file
///
/// # Errors
///
/// Returns an error if no file is given or configured, the file cannot be
/// read, or the state cannot be saved
pub fn load(ctx: &AuditContext, file: Option<&Path>) -> Result<()> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => ctx
            .config
            .scope_file_path(&ctx.workspace_root)
            .context("No scope file given and core.scope_file is not set")?,
    };

    let mut session = ctx.open_session()?;
    let (report, sync) = session.load_scope_file(&path)?;

    for rejected in &report.rejected {
        output::warning(&format!(
            "{}:{}: {} ({})",
            path.display(),
            rejected.line,
            rejected.entry,
            rejected.error
        ));
    }

    session.save_and_wait()?;
    output::success(&format!(
        "Loaded {} scope entr{} from {}",
        report.accepted.len(),
        if report.accepted.len() == 1 { "y" } else { "ies" },
        path.display()
    ));
    print_sync_report("synced", &sync);
    Ok(())
}
