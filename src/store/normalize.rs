//! Field-by-field coercion of an untrusted state document.
//!
//! The state file is user-editable and may come from an older or partially
//! written schema. Nothing here casts the parsed document wholesale into the
//! model: each field is checked on its own and replaced by a fallback when it
//! has the wrong shape, so one bad record never costs the rest of the state.
//!
//! The output of [`normalize_state`] is a fixed point: serializing it and
//! normalizing again yields an equal state.

use crate::model::{
    ActionType, DailyProgressEntry, FunctionFilters, FunctionRecord, FunctionStatus, FunctionTag,
    ProgressAction, RootState, STATE_VERSION, TrackedFile,
};
use crate::scope::ScopeSet;
use crate::utils::paths::display_relative;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};

/// Normalize a parsed document
///
/// Returns `None` when the top level is not a JSON object; the caller then
/// starts from a fresh default state.
#[must_use]
pub fn normalize_state(value: &Value, workspace_root: &Path) -> Option<RootState> {
    let Some(root) = value.as_object() else {
        warn!("State document is not a JSON object");
        return None;
    };

    Some(RootState {
        version: STATE_VERSION,
        scope: ScopeSet {
            scope_paths: string_list(root.get("scopePaths"), "scopePaths"),
            excluded_paths: string_list(root.get("excludedPaths"), "excludedPaths"),
        },
        function_filters: filters(root.get("functionFilters")),
        files: files(root.get("files"), workspace_root),
        progress_history: progress_history(root.get("progressHistory")),
        last_modified: timestamp(root.get("lastModified")),
    })
}

fn array(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Non-empty path strings, first occurrence wins; paths that compare equal
/// component-wise (`/a/b` and `/a/b/`) count as duplicates
fn string_list(value: Option<&Value>, field: &str) -> Vec<String> {
    let mut seen: BTreeSet<&Path> = BTreeSet::new();
    let mut out = Vec::new();
    for item in array(value) {
        match item.as_str() {
            Some(s) if !s.is_empty() => {
                if seen.insert(Path::new(s)) {
                    out.push(s.to_string());
                }
            }
            _ => debug!(field, ?item, "Dropping non-string path entry"),
        }
    }
    out
}

fn filters(value: Option<&Value>) -> FunctionFilters {
    let Some(obj) = value.and_then(Value::as_object) else {
        return FunctionFilters::default();
    };

    let statuses = array(obj.get("statuses"))
        .iter()
        .filter_map(Value::as_str)
        .filter_map(FunctionStatus::parse);
    let tags = array(obj.get("tags"))
        .iter()
        .filter_map(Value::as_str)
        .filter_map(FunctionTag::parse);

    // Empty status selections fall back to the default here
    FunctionFilters::new(statuses, tags)
}

/// Non-negative integer, accepting whole or fractional JSON numbers
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn non_negative(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 {
        Some(f.floor() as u64)
    } else {
        None
    }
}

fn line_number(value: Option<&Value>) -> Option<u32> {
    non_negative(value).and_then(|n| u32::try_from(n).ok())
}

fn counter(value: Option<&Value>) -> u64 {
    non_negative(value).unwrap_or(0)
}

fn flag(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}

fn read_count(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Bool(b)) => u32::from(*b),
        other => u32::from(counter(other) > 0),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn timestamp(value: Option<&Value>) -> i64 {
    let Some(value) = value else { return 0 };
    if let Some(n) = value.as_i64() {
        return n;
    }
    match value.as_f64() {
        Some(f) if f.is_finite() => f as i64,
        _ => 0,
    }
}

fn files(value: Option<&Value>, workspace_root: &Path) -> BTreeMap<String, TrackedFile> {
    let Some(obj) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    obj.iter()
        .filter_map(|(key, value)| tracked_file(key, value, workspace_root))
        .map(|file| (file.file_path.clone(), file))
        .collect()
}

fn tracked_file(key: &str, value: &Value, workspace_root: &Path) -> Option<TrackedFile> {
    if key.is_empty() {
        return None;
    }
    let Some(obj) = value.as_object() else {
        debug!(file = key, "Dropping malformed tracked file");
        return None;
    };

    let relative_path = obj
        .get("relativePath")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map_or_else(
            || display_relative(Path::new(key), workspace_root),
            str::to_string,
        );

    let mut seen = BTreeSet::new();
    let functions = array(obj.get("functions"))
        .iter()
        .filter_map(|f| function_record(key, f))
        .filter(|f| seen.insert(f.id.clone()))
        .collect();

    Some(TrackedFile {
        file_path: key.to_string(),
        relative_path,
        functions,
    })
}

fn function_record(file_path: &str, value: &Value) -> Option<FunctionRecord> {
    let obj: &Map<String, Value> = value.as_object()?;
    let Some(name) = obj.get("name").and_then(Value::as_str).filter(|n| !n.is_empty()) else {
        debug!(file = file_path, "Dropping function without a name");
        return None;
    };

    let start_line = line_number(obj.get("startLine")).unwrap_or(0);
    let end_line = line_number(obj.get("endLine"))
        .unwrap_or(start_line)
        .max(start_line);

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map_or_else(
            || FunctionRecord::derive_id(file_path, name, start_line),
            str::to_string,
        );

    Some(FunctionRecord {
        id,
        name: name.to_string(),
        file_path: file_path.to_string(),
        start_line,
        end_line,
        read_count: read_count(obj.get("readCount")),
        is_reviewed: flag(obj.get("isReviewed")),
        is_entrypoint: flag(obj.get("isEntrypoint")),
        is_admin: flag(obj.get("isAdmin")),
        is_hidden: flag(obj.get("isHidden")),
    })
}

/// Entries with a valid date; entries sharing a date are merged in order
fn progress_history(value: Option<&Value>) -> Vec<DailyProgressEntry> {
    let mut out: Vec<DailyProgressEntry> = Vec::new();
    for item in array(value) {
        let Some(entry) = progress_entry(item) else {
            continue;
        };
        match out.iter_mut().find(|e| e.date == entry.date) {
            Some(existing) => {
                debug!(date = %entry.date, "Merging duplicate progress entry");
                existing.functions_read = existing.functions_read.saturating_add(entry.functions_read);
                existing.functions_reviewed = existing
                    .functions_reviewed
                    .saturating_add(entry.functions_reviewed);
                existing.lines_read = existing.lines_read.saturating_add(entry.lines_read);
                existing.lines_reviewed = existing.lines_reviewed.saturating_add(entry.lines_reviewed);
                existing.files_read = existing.files_read.saturating_add(entry.files_read);
                existing.files_reviewed = existing.files_reviewed.saturating_add(entry.files_reviewed);
                existing.actions.extend(entry.actions);
            }
            None => out.push(entry),
        }
    }
    out
}

fn progress_entry(value: &Value) -> Option<DailyProgressEntry> {
    let obj = value.as_object()?;
    let raw_date = obj.get("date").and_then(Value::as_str)?;
    let Ok(date) = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") else {
        debug!(date = raw_date, "Dropping progress entry with invalid date");
        return None;
    };

    Some(DailyProgressEntry {
        date,
        functions_read: counter(obj.get("functionsRead")),
        functions_reviewed: counter(obj.get("functionsReviewed")),
        lines_read: counter(obj.get("linesRead")),
        lines_reviewed: counter(obj.get("linesReviewed")),
        files_read: counter(obj.get("filesRead")),
        files_reviewed: counter(obj.get("filesReviewed")),
        actions: array(obj.get("actions"))
            .iter()
            .filter_map(progress_action)
            .collect(),
    })
}

fn progress_action(value: &Value) -> Option<ProgressAction> {
    let obj = value.as_object()?;
    let action_type = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(ActionType::parse)?;
    let file_path = obj.get("filePath").and_then(Value::as_str)?;

    Some(ProgressAction {
        action_type,
        file_path: file_path.to_string(),
        function_name: obj
            .get("functionName")
            .and_then(Value::as_str)
            .map(str::to_string),
        line_count: line_number(obj.get("lineCount")),
    })
}
