use crate::AuditContext;
use crate::cli::{StatusArg, TagArg};
use crate::model::{FunctionFilters, FunctionStatus, FunctionTag};
use crate::output;
use anyhow::Result;

/// Show the active filters, or replace them
///
/// With neither statuses, tags nor `reset`, the filters are printed.
/// Selecting only tags keeps every status visible.
///
/// # Errors
///
/// Returns an error if the state cannot be saved
pub fn execute(
    ctx: &AuditContext,
    statuses: &[StatusArg],
    tags: &[TagArg],
    reset: bool,
) -> Result<()> {
    let mut session = ctx.open_session()?;

    if !reset && statuses.is_empty() && tags.is_empty() {
        println!("{}", describe(session.filters()));
        return Ok(());
    }

    if reset {
        session.set_filters(FunctionStatus::ALL, [] as [FunctionTag; 0]);
    } else {
        session.set_filters(
            statuses.iter().copied().map(FunctionStatus::from),
            tags.iter().copied().map(FunctionTag::from),
        );
    }

    session.save_and_wait()?;
    output::success(&format!("Filters: {}", describe(session.filters())));
    Ok(())
}

/// One-line description such as `status: read, reviewed; tags: admin`
#[must_use]
pub fn describe(filters: &FunctionFilters) -> String {
    let statuses = filters
        .statuses
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let tags = if filters.tags.is_empty() {
        "any".to_string()
    } else {
        filters
            .tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("status: {statuses}; tags: {tags}")
}
