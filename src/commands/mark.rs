use crate::AuditContext;
use crate::cli::{FileMarkStatus, MarkStatus};
use crate::commands::context::CommandContext;
use crate::extract::SymbolExtractor;
use crate::output;
use crate::session::ReviewSession;
use anyhow::Result;
use std::path::Path;

/// Change the review status of one function
///
/// # Errors
///
/// Returns an error if the file is not tracked, the function does not
/// exist, the transition is not allowed, or the state cannot be saved
pub fn execute(ctx: &AuditContext, status: MarkStatus, file: &str, function: &str) -> Result<()> {
    let mut session = ctx.open_session()?;
    let key = ctx.resolve_tracked_file(&session, file)?;

    let changed = match status {
        MarkStatus::Read => session.mark_read(&key, function)?,
        MarkStatus::Reviewed => session.mark_reviewed(&key, function)?,
        MarkStatus::Unread => session.unmark_read(&key, function)?,
        MarkStatus::Unreviewed => session.unmark_reviewed(&key, function)?,
    };

    if !changed {
        output::info(&format!("{function} is already {}", target_name(status)));
        return Ok(());
    }

    session.save_and_wait()?;
    output::success(&format!(
        "Marked {function} in {} as {}",
        ctx.display_path(Path::new(&key)),
        target_name(status)
    ));
    report_completion(&session, ctx, &key);
    Ok(())
}

/// Mark every function of a file read or reviewed
///
/// # Errors
///
/// Returns an error if the file is not tracked or the state cannot be saved
pub fn execute_file(ctx: &AuditContext, status: FileMarkStatus, file: &str) -> Result<()> {
    let mut session = ctx.open_session()?;
    let key = ctx.resolve_tracked_file(&session, file)?;
    let shown = ctx.display_path(Path::new(&key));

    let outcome = match status {
        FileMarkStatus::Read => session.mark_file_read(&key)?,
        FileMarkStatus::Reviewed => session.mark_file_reviewed(&key)?,
    };

    if outcome.changed > 0 {
        session.save_and_wait()?;
    }
    output::success(&format!(
        "Marked {} function(s) in {shown} as {}",
        outcome.changed,
        match status {
            FileMarkStatus::Read => "read",
            FileMarkStatus::Reviewed => "reviewed",
        }
    ));
    if outcome.rejected > 0 {
        output::warning(&format!(
            "Skipped {} unread function(s); mark them read first",
            outcome.rejected
        ));
    }
    if outcome.completed {
        output::action("completed", &shown);
    }
    Ok(())
}

const fn target_name(status: MarkStatus) -> &'static str {
    match status {
        MarkStatus::Read | MarkStatus::Unreviewed => "read",
        MarkStatus::Reviewed => "reviewed",
        MarkStatus::Unread => "unread",
    }
}

fn report_completion<E: SymbolExtractor>(session: &ReviewSession<E>, ctx: &AuditContext, key: &str) {
    let Some(file) = session.store().file(key) else {
        return;
    };
    let shown = ctx.display_path(Path::new(key));
    if file.is_fully_reviewed() {
        output::verbose(&format!("{shown} is fully reviewed"));
    } else if file.is_fully_read() {
        output::verbose(&format!("{shown} is fully read"));
    }
}
