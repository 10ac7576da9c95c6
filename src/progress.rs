//! Daily progress log and report aggregation.
//!
//! Every recorded action lands in the entry for its calendar date, which is
//! created on first use. The log is historical: the totals in a
//! [`ProgressReport`] are computed from the current tracked files, not by
//! replaying actions.
//!
//! The `record_*` methods assume the caller observed a genuine transition;
//! they do not de-duplicate.

use crate::filter::counts_towards_progress;
use crate::model::{ActionType, DailyProgressEntry, ProgressAction, RootState, TrackedFile};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

/// Today's date on the local clock
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Appends actions to a progress history
pub struct ProgressTracker<'a> {
    history: &'a mut Vec<DailyProgressEntry>,
}

impl<'a> ProgressTracker<'a> {
    /// Wrap a history for recording
    pub const fn new(history: &'a mut Vec<DailyProgressEntry>) -> Self {
        Self { history }
    }

    /// Entry for `date`, created lazily
    fn entry_for(&mut self, date: NaiveDate) -> &mut DailyProgressEntry {
        // Entries are appended in date order, so the match is almost always last
        let index = match self.history.iter().rposition(|e| e.date == date) {
            Some(index) => index,
            None => {
                debug!(%date, "Starting progress entry");
                self.history.push(DailyProgressEntry::new(date));
                self.history.len() - 1
            }
        };
        &mut self.history[index]
    }

    /// A function became read today
    pub fn record_function_read(&mut self, file_path: &str, name: &str, line_count: u32) {
        self.record_function_read_on(today(), file_path, name, line_count);
    }

    /// A function became read on `date`
    pub fn record_function_read_on(
        &mut self,
        date: NaiveDate,
        file_path: &str,
        name: &str,
        line_count: u32,
    ) {
        let entry = self.entry_for(date);
        entry.functions_read = entry.functions_read.saturating_add(1);
        entry.lines_read = entry.lines_read.saturating_add(u64::from(line_count));
        entry
            .actions
            .push(function_action(ActionType::FunctionRead, file_path, name, line_count));
    }

    /// A function became reviewed today
    pub fn record_function_reviewed(&mut self, file_path: &str, name: &str, line_count: u32) {
        self.record_function_reviewed_on(today(), file_path, name, line_count);
    }

    /// A function became reviewed on `date`
    pub fn record_function_reviewed_on(
        &mut self,
        date: NaiveDate,
        file_path: &str,
        name: &str,
        line_count: u32,
    ) {
        let entry = self.entry_for(date);
        entry.functions_reviewed = entry.functions_reviewed.saturating_add(1);
        entry.lines_reviewed = entry.lines_reviewed.saturating_add(u64::from(line_count));
        entry.actions.push(function_action(
            ActionType::FunctionReviewed,
            file_path,
            name,
            line_count,
        ));
    }

    /// Every non-hidden function of a file became read today
    pub fn record_file_read(&mut self, file_path: &str) {
        self.record_file_read_on(today(), file_path);
    }

    /// Every non-hidden function of a file became read on `date`
    pub fn record_file_read_on(&mut self, date: NaiveDate, file_path: &str) {
        let entry = self.entry_for(date);
        entry.files_read = entry.files_read.saturating_add(1);
        entry
            .actions
            .push(file_action(ActionType::FileRead, file_path));
    }

    /// Every non-hidden function of a file became reviewed today
    pub fn record_file_reviewed(&mut self, file_path: &str) {
        self.record_file_reviewed_on(today(), file_path);
    }

    /// Every non-hidden function of a file became reviewed on `date`
    pub fn record_file_reviewed_on(&mut self, date: NaiveDate, file_path: &str) {
        let entry = self.entry_for(date);
        entry.files_reviewed = entry.files_reviewed.saturating_add(1);
        entry
            .actions
            .push(file_action(ActionType::FileReviewed, file_path));
    }
}

fn function_action(
    action_type: ActionType,
    file_path: &str,
    name: &str,
    line_count: u32,
) -> ProgressAction {
    ProgressAction {
        action_type,
        file_path: file_path.to_string(),
        function_name: Some(name.to_string()),
        line_count: Some(line_count),
    }
}

fn file_action(action_type: ActionType, file_path: &str) -> ProgressAction {
    ProgressAction {
        action_type,
        file_path: file_path.to_string(),
        function_name: None,
        line_count: None,
    }
}

/// Current-state totals over non-hidden functions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressTotals {
    /// Non-hidden functions
    pub total_functions: usize,
    /// Non-hidden functions that are read or reviewed
    pub total_read: usize,
    /// Non-hidden functions that are reviewed
    pub total_reviewed: usize,
    /// Files with at least one non-hidden function
    pub total_files: usize,
    /// Files whose non-hidden functions are all read
    pub files_fully_read: usize,
    /// Files whose non-hidden functions are all reviewed
    pub files_fully_reviewed: usize,
}

impl ProgressTotals {
    /// Aggregate totals over tracked files
    pub fn from_files<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = &'a TrackedFile>,
    {
        let mut totals = Self::default();
        for file in files {
            if !counts_towards_progress(file) {
                continue;
            }
            totals.total_files += 1;
            for function in file.non_hidden() {
                totals.total_functions += 1;
                if function.is_read() {
                    totals.total_read += 1;
                }
                if function.is_reviewed {
                    totals.total_reviewed += 1;
                }
            }
            if file.is_fully_read() {
                totals.files_fully_read += 1;
            }
            if file.is_fully_reviewed() {
                totals.files_fully_reviewed += 1;
            }
        }
        totals
    }

    /// Share of functions read, 0-100
    #[must_use]
    pub fn read_percent(&self) -> f64 {
        percent(self.total_read, self.total_functions)
    }

    /// Share of functions reviewed, 0-100
    #[must_use]
    pub fn reviewed_percent(&self) -> f64 {
        percent(self.total_reviewed, self.total_functions)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// One day of the report with actions partitioned by type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayReport {
    /// Calendar date
    pub date: NaiveDate,
    /// Functions marked read
    pub functions_read: u64,
    /// Functions marked reviewed
    pub functions_reviewed: u64,
    /// Lines read
    pub lines_read: u64,
    /// Lines reviewed
    pub lines_reviewed: u64,
    /// Files completed as read
    pub files_read: u64,
    /// Files completed as reviewed
    pub files_reviewed: u64,
    /// `functionRead` actions
    pub read_functions: Vec<ProgressAction>,
    /// `functionReviewed` actions
    pub reviewed_functions: Vec<ProgressAction>,
    /// `fileRead` actions
    pub read_files: Vec<ProgressAction>,
    /// `fileReviewed` actions
    pub reviewed_files: Vec<ProgressAction>,
}

impl From<&DailyProgressEntry> for DayReport {
    fn from(entry: &DailyProgressEntry) -> Self {
        let collect = |kind: ActionType| entry.actions_of(kind).cloned().collect::<Vec<_>>();
        Self {
            date: entry.date,
            functions_read: entry.functions_read,
            functions_reviewed: entry.functions_reviewed,
            lines_read: entry.lines_read,
            lines_reviewed: entry.lines_reviewed,
            files_read: entry.files_read,
            files_reviewed: entry.files_reviewed,
            read_functions: collect(ActionType::FunctionRead),
            reviewed_functions: collect(ActionType::FunctionReviewed),
            read_files: collect(ActionType::FileRead),
            reviewed_files: collect(ActionType::FileReviewed),
        }
    }
}

/// Days (newest first) plus current-state totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    /// Days, newest first
    pub days: Vec<DayReport>,
    /// Totals over the current files
    pub totals: ProgressTotals,
}

/// Build the report for a state snapshot
#[must_use]
pub fn progress_report(state: &RootState) -> ProgressReport {
    let mut days: Vec<DayReport> = state.progress_history.iter().map(DayReport::from).collect();
    days.sort_by(|a, b| b.date.cmp(&a.date));

    ProgressReport {
        days,
        totals: ProgressTotals::from_files(state.files.values()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FunctionRecord;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_same_day_accumulates_in_one_entry() {
        let mut history = Vec::new();
        let mut tracker = ProgressTracker::new(&mut history);
        let day = date("2026-03-02");

        tracker.record_function_read_on(day, "/repo/a.sol", "f", 10);
        tracker.record_function_read_on(day, "/repo/a.sol", "g", 5);

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].functions_read, 2);
        assert_eq!(history[0].lines_read, 15);
        assert_eq!(history[0].actions.len(), 2);
    }

    #[test]
    fn test_counters_saturate_instead_of_overflowing() {
        let day = date("2026-10-17");
        let mut entry = DailyProgressEntry::new(day);
        entry.functions_read = u64::MAX;
        entry.lines_read = u64::MAX - 2;
        entry.files_reviewed = u64::MAX;
        let mut history = vec![entry];
        let mut tracker = ProgressTracker::new(&mut history);

        tracker.record_function_read_on(day, "/repo/a.sol", "f", 10);
        tracker.record_file_reviewed_on(day, "/repo/a.sol");

        assert_eq!(history[0].functions_read, u64::MAX);
        assert_eq!(history[0].lines_read, u64::MAX);
        assert_eq!(history[0].files_reviewed, u64::MAX);
        assert_eq!(history[0].actions.len(), 2);
    }

    #[test]
    fn test_new_day_starts_new_entry() {
        let mut history = Vec::new();
        let mut tracker = ProgressTracker::new(&mut history);

        tracker.record_function_read_on(date("2026-03-02"), "/repo/a.sol", "f", 1);
        tracker.record_function_reviewed_on(date("2026-03-03"), "/repo/a.sol", "f", 1);
        tracker.record_file_reviewed_on(date("2026-03-03"), "/repo/a.sol");

        assert_eq!(history.len(), 2);
        assert_eq!(history[1].functions_reviewed, 1);
        assert_eq!(history[1].files_reviewed, 1);
        assert_eq!(history[1].actions[1].function_name, None);
    }

    #[test]
    fn test_report_sorts_days_descending_and_partitions() {
        let mut state = RootState::default();
        {
            let mut tracker = ProgressTracker::new(&mut state.progress_history);
            tracker.record_function_read_on(date("2026-03-01"), "/repo/a.sol", "f", 3);
            tracker.record_function_read_on(date("2026-03-04"), "/repo/a.sol", "g", 3);
            tracker.record_file_read_on(date("2026-03-04"), "/repo/a.sol");
        }

        let report = progress_report(&state);

        assert_eq!(report.days[0].date, date("2026-03-04"));
        assert_eq!(report.days[0].read_functions.len(), 1);
        assert_eq!(report.days[0].read_files.len(), 1);
        assert_eq!(report.days[1].date, date("2026-03-01"));
    }

    #[test]
    fn test_totals_from_current_files_skip_hidden() {
        let mut file = TrackedFile::new("/repo/a.sol", "a.sol");
        let mut read = FunctionRecord::new("/repo/a.sol", "a", 0, 1);
        read.read_count = 1;
        let mut reviewed = FunctionRecord::new("/repo/a.sol", "b", 2, 3);
        reviewed.read_count = 1;
        reviewed.is_reviewed = true;
        let mut hidden = FunctionRecord::new("/repo/a.sol", "c", 4, 5);
        hidden.is_hidden = true;
        file.functions = vec![read, reviewed, hidden];

        let empty = TrackedFile::new("/repo/b.sol", "b.sol");

        let totals = ProgressTotals::from_files([&file, &empty]);
        assert_eq!(totals.total_files, 1);
        assert_eq!(totals.total_functions, 2);
        assert_eq!(totals.total_read, 2);
        assert_eq!(totals.total_reviewed, 1);
        assert_eq!(totals.files_fully_read, 1);
        assert_eq!(totals.files_fully_reviewed, 0);
        assert!((totals.read_percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_totals_have_zero_percent() {
        let totals = ProgressTotals::default();
        assert!(totals.reviewed_percent().abs() < f64::EPSILON);
    }
}
