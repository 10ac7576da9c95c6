use crate::AuditContext;
use crate::commands::context::CommandContext;
use crate::model::ProgressAction;
use crate::output;
use crate::progress::{DayReport, ProgressReport};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Show the daily progress log, newest day first
///
/// # Errors
///
/// Returns an error if the report cannot be serialized
pub fn execute(ctx: &AuditContext, days: usize, json: bool) -> Result<()> {
    let session = ctx.open_session()?;
    let report = session.progress_report();

    if json {
        println!("{}", render_json(&report)?);
        return Ok(());
    }

    if report.days.is_empty() {
        output::info("No progress recorded yet");
        return Ok(());
    }

    for day in report.days.iter().take(days) {
        println!("{}", day_line(day));
        for action in day
            .read_files
            .iter()
            .chain(&day.reviewed_files)
            .chain(&day.read_functions)
            .chain(&day.reviewed_functions)
        {
            output::verbose(&format!("    {}", action_line(ctx, action)));
        }
    }
    Ok(())
}

/// Full report as pretty JSON
///
/// # Errors
///
/// Returns an error if serialization fails
pub fn render_json(report: &ProgressReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize progress report")
}

fn day_line(day: &DayReport) -> String {
    format!(
        "{}  read {} fn / {} lines, reviewed {} fn / {} lines, files {} read / {} reviewed",
        day.date.to_string().bold(),
        day.functions_read,
        day.lines_read,
        day.functions_reviewed,
        day.lines_reviewed,
        day.files_read,
        day.files_reviewed
    )
}

fn action_line(ctx: &AuditContext, action: &ProgressAction) -> String {
    let file = ctx.display_path(Path::new(&action.file_path));
    match &action.function_name {
        Some(name) => format!("{} {file}::{name}", action.action_type.as_str()),
        None => format!("{} {file}", action.action_type.as_str()),
    }
}
