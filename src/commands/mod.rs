pub mod clear;
pub mod config;
pub mod context;
pub mod filter;
pub mod flag;
pub mod list;
pub mod mark;
pub mod progress;
pub mod scope;
pub mod status;
pub mod sync;

use crate::output;
use crate::session::SyncReport;

/// One-line summary of a sync, printed as an action
pub fn print_sync_report(verb: &str, report: &SyncReport) {
    output::action(
        verb,
        &format!(
            "{} file(s), {} function(s) ({} new, {} dropped)",
            report.files, report.functions, report.added, report.dropped
        ),
    );
    if report.removed > 0 {
        output::info(&format!("Dropped {} file(s) no longer in scope", report.removed));
    }
    if report.skipped > 0 {
        output::verbose(&format!("Skipped {} file(s) without functions", report.skipped));
    }
    if report.failed > 0 {
        output::warning(&format!(
            "Could not extract functions from {} file(s); is ctags installed?",
            report.failed
        ));
    }
}
