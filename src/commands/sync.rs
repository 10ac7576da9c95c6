use crate::AuditContext;
use crate::commands::print_sync_report;
use crate::session::SyncReport;
use crate::utils::paths::make_absolute;
use anyhow::Result;
use std::path::PathBuf;

/// Re-extract functions and reconcile them with recorded progress
///
/// With no paths, vanished files are dropped and every scope path is
/// synced. Relative paths resolve against the workspace root.
///
/// # Errors
///
/// Returns an error if a folder cannot be walked or the state cannot be saved
pub fn execute(ctx: &AuditContext, paths: &[PathBuf]) -> Result<()> {
    let mut session = ctx.open_session()?;

    let report = if paths.is_empty() {
        session.sync_all()?
    } else {
        let mut total = SyncReport::default();
        for path in paths {
            let path = make_absolute(path, &ctx.workspace_root)?;
            total.merge(&session.sync_under(&path)?);
        }
        total
    };

    session.save_and_wait()?;
    print_sync_report("synced", &report);
    Ok(())
}
