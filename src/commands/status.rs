use crate::AuditContext;
use crate::commands::context::CommandContext;
use crate::commands::filter::describe;
use crate::output;
use crate::progress::ProgressTotals;
use crate::utils::formatters::{format_ratio, format_timestamp_millis};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Width of the completion bars
const BAR_WIDTH: usize = 30;

/// Show scope, review totals and active filters
///
/// # Errors
///
/// Returns an error if the state store cannot be opened
pub fn execute(ctx: &AuditContext) -> Result<()> {
    let session = ctx.open_session()?;
    let store = session.store();
    let scope = store.scope();

    output::section("Scope");
    if scope.is_empty() {
        println!("  {}", "nothing in scope (use 'atr add <path>')".dimmed());
    }
    for path in &scope.scope_paths {
        println!("  {}", ctx.display_path(Path::new(path)));
    }
    for path in &scope.excluded_paths {
        println!(
            "  {} {}",
            "excluded".yellow(),
            ctx.display_path(Path::new(path))
        );
    }

    let totals = ProgressTotals::from_files(store.files().values());
    println!();
    output::section("Review");
    println!(
        "  functions read      {} {}",
        output::completion_bar(totals.read_percent(), BAR_WIDTH),
        format_ratio(totals.total_read, totals.total_functions, totals.read_percent())
    );
    println!(
        "  functions reviewed  {} {}",
        output::completion_bar(totals.reviewed_percent(), BAR_WIDTH),
        format_ratio(
            totals.total_reviewed,
            totals.total_functions,
            totals.reviewed_percent()
        )
    );
    println!(
        "  files               {} read, {} reviewed of {}",
        totals.files_fully_read, totals.files_fully_reviewed, totals.total_files
    );

    if !session.filters().is_default() {
        println!();
        output::section("Filters");
        println!("  {}", describe(session.filters()));
    }

    output::verbose(&format!("State: {}", store.state_path().display()));
    output::verbose(&format!(
        "Last saved: {}",
        format_timestamp_millis(store.state().last_modified)
    ));
    Ok(())
}
