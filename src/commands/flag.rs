use crate::AuditContext;
use crate::cli::FlagKind;
use crate::commands::context::CommandContext;
use crate::model::FunctionTag;
use crate::output;
use anyhow::Result;
use std::path::Path;

/// Set or clear the entrypoint, admin or hidden flag of a function
///
/// # Errors
///
/// Returns an error if the file is not tracked, the function does not
/// exist, or the state cannot be saved
pub fn execute(
    ctx: &AuditContext,
    flag: FlagKind,
    file: &str,
    function: &str,
    on: bool,
) -> Result<()> {
    let mut session = ctx.open_session()?;
    let key = ctx.resolve_tracked_file(&session, file)?;

    let changed = match flag {
        FlagKind::Entrypoint => session.set_tag(&key, function, FunctionTag::Entrypoint, on)?,
        FlagKind::Admin => session.set_tag(&key, function, FunctionTag::Admin, on)?,
        FlagKind::Hidden => session.set_hidden(&key, function, on)?,
    };

    let (name, verb) = match (flag, on) {
        (FlagKind::Hidden, true) => ("hidden", "Hid"),
        (FlagKind::Hidden, false) => ("hidden", "Unhid"),
        (FlagKind::Entrypoint, true) => ("entrypoint", "Tagged"),
        (FlagKind::Admin, true) => ("admin", "Tagged"),
        (FlagKind::Entrypoint, false) => ("entrypoint", "Untagged"),
        (FlagKind::Admin, false) => ("admin", "Untagged"),
    };

    if !changed {
        output::info(&format!(
            "{function} {} {name}",
            if on { "is already" } else { "is not" }
        ));
        return Ok(());
    }

    session.save_and_wait()?;
    let shown = ctx.display_path(Path::new(&key));
    if flag == FlagKind::Hidden {
        output::success(&format!("{verb} {function} in {shown}"));
    } else {
        output::success(&format!("{verb} {function} in {shown} as {name}"));
    }
    Ok(())
}
