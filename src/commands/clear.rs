use crate::AuditContext;
use crate::commands::context::CommandContext;
use crate::output;
use anyhow::Result;

/// Reset scope, files, filters and history
///
/// # Errors
///
/// Returns an error if confirmation cannot be read or the state cannot be saved
pub fn execute(ctx: &AuditContext, yes: bool) -> Result<()> {
    if !yes && !ctx.confirm("Discard all review progress?")? {
        output::info("Aborted");
        return Ok(());
    }

    let mut session = ctx.open_session()?;
    session.clear_all();
    session.save_and_wait()?;
    output::success("Cleared all review state");
    Ok(())
}
