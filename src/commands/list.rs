use crate::AuditContext;
use crate::commands::context::CommandContext;
use crate::model::{FunctionRecord, TrackedFile};
use crate::output;
use crate::progress::ProgressTotals;
use crate::utils::formatters::{format_function_line, format_ratio, truncate_with_ellipsis};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Widest path shown in the file listing
const MAX_PATH_WIDTH: usize = 72;

/// List visible files, or the visible functions of one file
///
/// # Errors
///
/// Returns an error if `file` is given but not tracked
pub fn execute(ctx: &AuditContext, file: Option<&str>, ids: bool, all: bool) -> Result<()> {
    let session = ctx.open_session()?;

    let Some(file) = file else {
        let files: Vec<&TrackedFile> = if all {
            session.store().files().values().collect()
        } else {
            session.visible_files()
        };
        if files.is_empty() {
            output::info("No files to show");
            return Ok(());
        }
        for tracked in files {
            println!("{}", file_line(tracked));
        }
        return Ok(());
    };

    let key = ctx.resolve_tracked_file(&session, file)?;
    let functions: Vec<&FunctionRecord> = if all {
        session
            .store()
            .file(&key)
            .map(|f| f.functions.iter().collect())
            .unwrap_or_default()
    } else {
        session.visible_functions(&key)?
    };

    output::section(&ctx.display_path(Path::new(&key)));
    if functions.is_empty() {
        output::info("No functions to show");
    }
    for record in functions {
        if ids {
            println!("  {}  {}", format_function_line(record), record.id.dimmed());
        } else {
            println!("  {}", format_function_line(record));
        }
    }
    Ok(())
}

fn file_line(file: &TrackedFile) -> String {
    let totals = ProgressTotals::from_files([file]);
    format!(
        "{}  {}",
        truncate_with_ellipsis(&file.relative_path, MAX_PATH_WIDTH),
        format_ratio(totals.total_read, totals.total_functions, totals.read_percent()).dimmed()
    )
}
