use crate::model::{FunctionRecord, FunctionStatus};
use colored::Colorize;
use std::time::{Duration, UNIX_EPOCH};

/// Returns the colored status marker
#[must_use]
pub fn colored_status(status: FunctionStatus) -> String {
    match status {
        FunctionStatus::Unread => "[ ]".bright_black().to_string(),
        FunctionStatus::Read => "[R]".yellow().to_string(),
        FunctionStatus::Reviewed => "[V]".green().to_string(),
    }
}

/// Tag suffix such as ` (entrypoint, admin)`, empty when untagged
#[must_use]
pub fn format_tags(record: &FunctionRecord) -> String {
    let mut tags = Vec::new();
    if record.is_entrypoint {
        tags.push("entrypoint");
    }
    if record.is_admin {
        tags.push("admin");
    }
    if record.is_hidden {
        tags.push("hidden");
    }
    if tags.is_empty() {
        String::new()
    } else {
        format!(" ({})", tags.join(", "))
    }
}

/// One function line for list output
#[must_use]
pub fn format_function_line(record: &FunctionRecord) -> String {
    format!(
        "{} {} {}{}",
        colored_status(record.status()),
        record.name.bold(),
        format!("L{}-{}", record.start_line + 1, record.end_line + 1).dimmed(),
        format_tags(record).cyan()
    )
}

/// Formats `part / whole` with a percentage
#[must_use]
pub fn format_ratio(part: usize, whole: usize, percent: f64) -> String {
    format!("{part}/{whole} ({percent:.1}%)")
}

/// Formats a millisecond timestamp as RFC 3339, or `never` for zero
#[must_use]
pub fn format_timestamp_millis(millis: i64) -> String {
    match u64::try_from(millis) {
        Ok(0) | Err(_) => "never".to_string(),
        Ok(ms) => humantime::format_rfc3339_seconds(UNIX_EPOCH + Duration::from_millis(ms))
            .to_string(),
    }
}

/// Truncates a string to a maximum length with ellipsis
#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len < 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}
