//! Review operations over one workspace.
//!
//! [`ReviewSession`] is the only place that changes review flags. It enforces
//! the status machine
//!
//! ```text
//! unread --mark_read--> read --mark_reviewed--> reviewed
//! unread <-unmark_read- read <-unmark_reviewed- reviewed
//! ```
//!
//! logs forward transitions to the daily progress history, and logs a file
//! as completed when a forward transition makes every non-hidden function of
//! that file read (or reviewed). Backward transitions and flag changes are
//! never logged.
//!
//! Nothing is persisted implicitly; callers decide when to [`save`].
//!
//! [`save`]: ReviewSession::save

use crate::error::AuditError;
use crate::extract::{SymbolExtractor, SymbolKind, to_records};
use crate::filter;
use crate::model::{
    FunctionFilters, FunctionFlags, FunctionRecord, FunctionStatus, FunctionTag, TrackedFile,
};
use crate::progress::{ProgressReport, progress_report, today};
use crate::reconcile::ReconcileSummary;
use crate::scope_file::{self, ScopeFileReport};
use crate::store::persist::PendingSave;
use crate::store::{ScopeRemoval, StateStore};
use crate::utils::paths::{is_within_directory, make_absolute};
use crate::utils::{should_ignore, walk_dir_filtered};
use anyhow::Result;
use chrono::NaiveDate;
use glob::Pattern;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{Level, debug, info, span, warn};

/// Counts from one or more file syncs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files whose functions were reconciled
    pub files: usize,
    /// Functions tracked across those files afterwards
    pub functions: usize,
    /// Functions that are new
    pub added: usize,
    /// Functions that disappeared
    pub dropped: usize,
    /// Files whose extraction failed
    pub failed: usize,
    /// Files found while walking that contain no functions
    pub skipped: usize,
    /// Tracked files removed because they vanished or left scope
    pub removed: usize,
}

impl SyncReport {
    fn absorb(&mut self, summary: ReconcileSummary, functions: usize) {
        self.files += 1;
        self.functions += functions;
        self.added += summary.added;
        self.dropped += summary.dropped;
    }

    /// Add another report's counts to this one
    pub const fn merge(&mut self, other: &Self) {
        self.files += other.files;
        self.functions += other.functions;
        self.added += other.added;
        self.dropped += other.dropped;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.removed += other.removed;
    }
}

/// Outcome of a bulk file transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Functions that changed status
    pub changed: usize,
    /// Functions skipped because the transition is not allowed from their status
    pub rejected: usize,
    /// Whether the file became complete
    pub completed: bool,
}

/// Completion state of a file before and after a change
#[derive(Debug, Clone, Copy, Default)]
struct Completion {
    read: bool,
    reviewed: bool,
}

/// A review session: state, extraction and the status machine
pub struct ReviewSession<E = Box<dyn SymbolExtractor>> {
    /// State owner
    store: StateStore,
    /// Symbol source
    extractor: E,
    /// Symbol kinds tracked, all function-like kinds when empty
    kinds: Vec<SymbolKind>,
    /// Patterns pruned from directory walks, matched relative to the walked folder
    ignore: Vec<Pattern>,
    /// Date source for progress entries
    clock: fn() -> NaiveDate,
}

impl<E: SymbolExtractor> ReviewSession<E> {
    /// Create a session over an opened store
    pub fn new(store: StateStore, extractor: E) -> Self {
        Self {
            store,
            extractor,
            kinds: Vec::new(),
            ignore: Vec::new(),
            clock: today,
        }
    }

    /// Use a different date source for progress entries
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// Restrict tracked symbol kinds
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<SymbolKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Prune matching paths from directory walks
    #[must_use]
    pub fn with_ignore_patterns(mut self, ignore: Vec<Pattern>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &StateStore {
        &self.store
    }

    /// Symbol source, for callers that feed it directly
    pub const fn extractor_mut(&mut self) -> &mut E {
        &mut self.extractor
    }

    /// Inclusion query
    #[must_use]
    pub fn is_in_scope(&self, path: &str) -> bool {
        self.store.is_in_scope(path)
    }

    /// Bring a file or folder into scope and sync what it covers
    ///
    /// Relative paths resolve against the workspace root.
    ///
    /// # Errors
    ///
    /// Fails with `AuditError::PathOutsideWorkspace` or
    /// `AuditError::PathNotFound` before changing anything, or with an I/O
    /// error from walking the folder.
    pub fn add_to_scope(&mut self, path: &Path) -> Result<SyncReport> {
        let root = self.store.workspace_root().to_path_buf();
        let path = make_absolute(path, &root)?;
        if !is_within_directory(&path, &root) {
            return Err(AuditError::PathOutsideWorkspace { path, root }.into());
        }
        if !path.exists() {
            return Err(AuditError::PathNotFound(path).into());
        }

        let key = path.to_string_lossy().into_owned();
        if self.store.add_scope_path(&key) {
            info!(path = %key, "Added to scope");
        }
        self.sync_under(&path)
    }

    /// Take a path out of scope; see [`StateStore::remove_from_scope`]
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is needed to resolve `path`
    /// and cannot be determined.
    pub fn remove_from_scope(&mut self, path: &Path) -> Result<ScopeRemoval> {
        let path = make_absolute(path, self.store.workspace_root())?;
        let removal = self.store.remove_from_scope(&path.to_string_lossy());
        debug!(path = %path.display(), ?removal, "Removed from scope");
        Ok(removal)
    }

    /// Load a scope definition file and add every accepted entry
    ///
    /// Rejected lines are returned in the report; they never stop the
    /// remaining lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a folder walk fails.
    pub fn load_scope_file(&mut self, path: &Path) -> Result<(ScopeFileReport, SyncReport)> {
        let root = self.store.workspace_root().to_path_buf();
        let report = scope_file::load_scope_file(path, &root)?;
        for rejected in &report.rejected {
            warn!(
                line = rejected.line,
                entry = %rejected.entry,
                error = %rejected.error,
                "Scope line rejected"
            );
        }

        let mut sync = SyncReport::default();
        for accepted in &report.accepted {
            sync.merge(&self.add_to_scope(accepted)?);
        }
        Ok((report, sync))
    }

    /// Re-extract one file and reconcile it
    ///
    /// Returns `None` when the file is not in scope. Extraction failure
    /// leaves the file tracked with no functions.
    pub fn sync_file(&mut self, path: &str) -> Option<SyncReport> {
        if !self.store.is_in_scope(path) {
            debug!(path, "Not in scope, skipping sync");
            return None;
        }
        let mut report = SyncReport::default();
        self.sync_one(path, true, &mut report);
        Some(report)
    }

    /// Sync every in-scope file at or below `path`
    ///
    /// Files discovered in a folder walk that contain no function-like
    /// symbols are not tracked.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be walked.
    pub fn sync_under(&mut self, path: &Path) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        for file in self.scope_files(path)? {
            let tracked = self.store.file(&file).is_some();
            self.sync_one(&file, tracked || path.is_file(), &mut report);
        }
        Ok(report)
    }

    /// Drop vanished files, then sync every scope path
    ///
    /// # Errors
    ///
    /// Returns an error if a folder cannot be walked.
    pub fn sync_all(&mut self) -> Result<SyncReport> {
        let span = span!(Level::DEBUG, "sync_all");
        let _guard = span.enter();

        let mut report = SyncReport::default();
        let stale: Vec<String> = self
            .store
            .files()
            .keys()
            .filter(|path| !self.store.is_in_scope(path) || !Path::new(path).is_file())
            .cloned()
            .collect();
        for path in stale {
            debug!(path = %path, "Dropping vanished file");
            self.store.remove_file(&path);
            report.removed += 1;
        }

        let mut files = BTreeSet::new();
        for scope_path in self.store.scope().scope_paths.clone() {
            files.extend(self.scope_files(Path::new(&scope_path))?);
        }
        for file in files {
            let track_empty = self.store.file(&file).is_some()
                || self.store.scope().is_scope_path(&file);
            self.sync_one(&file, track_empty, &mut report);
        }

        debug!(files = report.files, removed = report.removed, "Sync complete");
        Ok(report)
    }

    /// In-scope files at or below `path`
    fn scope_files(&self, path: &Path) -> Result<Vec<String>> {
        if path.is_file() {
            let key = path.to_string_lossy().into_owned();
            return Ok(if self.store.is_in_scope(&key) {
                vec![key]
            } else {
                Vec::new()
            });
        }
        if !path.is_dir() {
            warn!(path = %path.display(), "Scope path does not exist");
            return Ok(Vec::new());
        }

        let ignore = &self.ignore;
        let files = walk_dir_filtered(
            path,
            |p| {
                p.strip_prefix(path)
                    .map_or(true, |rel| !should_ignore(rel, ignore))
            },
            false,
        )?;
        Ok(files
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .filter(|key| self.store.is_in_scope(key))
            .collect())
    }

    fn sync_one(&mut self, path: &str, track_empty: bool, report: &mut SyncReport) {
        let extracted = self.extractor.extract(Path::new(path));
        let failed = extracted.is_none();
        let records = to_records(path, extracted.unwrap_or_default(), &self.kinds);

        if records.is_empty() && !failed && !track_empty {
            debug!(path, "No functions, not tracking");
            report.skipped += 1;
            return;
        }
        if failed {
            warn!(path, "Symbol extraction failed, tracking with no functions");
            report.failed += 1;
        }

        let count = records.len();
        let summary = self.store.replace_functions(path, records);
        report.absorb(summary, count);
    }

    /// Tracked file by absolute path or by its workspace-relative path
    #[must_use]
    pub fn find_file(&self, reference: &str) -> Option<&TrackedFile> {
        self.store.file(reference).or_else(|| {
            let reference = reference.trim_start_matches("./");
            self.store
                .files()
                .values()
                .find(|f| f.relative_path == reference)
        })
    }

    fn target(&self, file: &str, reference: &str) -> Result<FunctionRecord, AuditError> {
        self.store
            .file(file)
            .ok_or_else(|| AuditError::FileNotTracked(file.to_string()))?
            .find_function(reference)
            .cloned()
            .ok_or_else(|| AuditError::FunctionNotFound {
                file: file.to_string(),
                function: reference.to_string(),
            })
    }

    fn completion(&self, file: &str) -> Completion {
        self.store.file(file).map_or_else(Completion::default, |f| Completion {
            read: f.is_fully_read(),
            reviewed: f.is_fully_reviewed(),
        })
    }

    fn log_completion(&mut self, file: &str, before: Completion) -> bool {
        let after = self.completion(file);
        let date = (self.clock)();
        let mut completed = false;
        if !before.read && after.read {
            info!(file, "File fully read");
            self.store.progress().record_file_read_on(date, file);
            completed = true;
        }
        if !before.reviewed && after.reviewed {
            info!(file, "File fully reviewed");
            self.store.progress().record_file_reviewed_on(date, file);
            completed = true;
        }
        completed
    }

    /// unread -> read; logs `functionRead`
    ///
    /// Returns `false` if the function was already read or reviewed.
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked` or `FunctionNotFound`.
    pub fn mark_read(&mut self, file: &str, function: &str) -> Result<bool, AuditError> {
        let record = self.target(file, function)?;
        if record.is_read() {
            return Ok(false);
        }

        let before = self.completion(file);
        self.store.set_function_flags(
            file,
            &record.id,
            FunctionFlags {
                read_count: 1,
                ..record.flags()
            },
        )?;
        let date = (self.clock)();
        self.store
            .progress()
            .record_function_read_on(date, file, &record.name, record.line_count());
        self.log_completion(file, before);
        Ok(true)
    }

    /// read -> reviewed; logs `functionReviewed`
    ///
    /// Returns `false` if the function was already reviewed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for an unread function, leaving state and
    /// counters untouched, or `FileNotTracked` / `FunctionNotFound`.
    pub fn mark_reviewed(&mut self, file: &str, function: &str) -> Result<bool, AuditError> {
        let record = self.target(file, function)?;
        match record.status() {
            FunctionStatus::Reviewed => return Ok(false),
            FunctionStatus::Unread => {
                return Err(AuditError::InvalidTransition {
                    function: record.name,
                    from: FunctionStatus::Unread,
                    to: FunctionStatus::Reviewed,
                });
            }
            FunctionStatus::Read => {}
        }

        let before = self.completion(file);
        self.store.set_function_flags(
            file,
            &record.id,
            FunctionFlags {
                is_reviewed: true,
                ..record.flags()
            },
        )?;
        let date = (self.clock)();
        self.store
            .progress()
            .record_function_reviewed_on(date, file, &record.name, record.line_count());
        self.log_completion(file, before);
        Ok(true)
    }

    /// reviewed -> read; not logged
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked` or `FunctionNotFound`.
    pub fn unmark_reviewed(&mut self, file: &str, function: &str) -> Result<bool, AuditError> {
        let record = self.target(file, function)?;
        if !record.is_reviewed {
            return Ok(false);
        }
        self.store.set_function_flags(
            file,
            &record.id,
            FunctionFlags {
                is_reviewed: false,
                ..record.flags()
            },
        )?;
        Ok(true)
    }

    /// read or reviewed -> unread; clears the review too; not logged
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked` or `FunctionNotFound`.
    pub fn unmark_read(&mut self, file: &str, function: &str) -> Result<bool, AuditError> {
        let record = self.target(file, function)?;
        if !record.is_read() {
            return Ok(false);
        }
        self.store.set_function_flags(
            file,
            &record.id,
            FunctionFlags {
                read_count: 0,
                is_reviewed: false,
                ..record.flags()
            },
        )?;
        Ok(true)
    }

    fn set_flag(
        &mut self,
        file: &str,
        function: &str,
        update: impl FnOnce(&mut FunctionFlags) -> &mut bool,
        on: bool,
    ) -> Result<bool, AuditError> {
        let record = self.target(file, function)?;
        let mut flags = record.flags();
        let slot = update(&mut flags);
        if *slot == on {
            return Ok(false);
        }
        *slot = on;
        self.store.set_function_flags(file, &record.id, flags)?;
        Ok(true)
    }

    /// Set or clear the entrypoint tag
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked` or `FunctionNotFound`.
    pub fn set_entrypoint(
        &mut self,
        file: &str,
        function: &str,
        on: bool,
    ) -> Result<bool, AuditError> {
        self.set_flag(file, function, |f| &mut f.is_entrypoint, on)
    }

    /// Set or clear the admin tag
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked` or `FunctionNotFound`.
    pub fn set_admin(&mut self, file: &str, function: &str, on: bool) -> Result<bool, AuditError> {
        self.set_flag(file, function, |f| &mut f.is_admin, on)
    }

    /// Hide or unhide a function
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked` or `FunctionNotFound`.
    pub fn set_hidden(&mut self, file: &str, function: &str, on: bool) -> Result<bool, AuditError> {
        self.set_flag(file, function, |f| &mut f.is_hidden, on)
    }

    /// Set or clear a classification tag
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked` or `FunctionNotFound`.
    pub fn set_tag(
        &mut self,
        file: &str,
        function: &str,
        tag: FunctionTag,
        on: bool,
    ) -> Result<bool, AuditError> {
        match tag {
            FunctionTag::Entrypoint => self.set_entrypoint(file, function, on),
            FunctionTag::Admin => self.set_admin(file, function, on),
        }
    }

    /// Mark every non-hidden unread function of a file read
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked`.
    pub fn mark_file_read(&mut self, file: &str) -> Result<BulkOutcome, AuditError> {
        let pending = self.non_hidden_records(file)?;
        let before = self.completion(file);
        let date = (self.clock)();
        let mut outcome = BulkOutcome::default();

        for record in pending.into_iter().filter(|r| !r.is_read()) {
            self.store.set_function_flags(
                file,
                &record.id,
                FunctionFlags {
                    read_count: 1,
                    ..record.flags()
                },
            )?;
            self.store
                .progress()
                .record_function_read_on(date, file, &record.name, record.line_count());
            outcome.changed += 1;
        }

        outcome.completed = self.log_completion(file, before);
        Ok(outcome)
    }

    /// Mark every non-hidden read function of a file reviewed
    ///
    /// Unread functions cannot be reviewed; they are counted in `rejected`.
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked`.
    pub fn mark_file_reviewed(&mut self, file: &str) -> Result<BulkOutcome, AuditError> {
        let pending = self.non_hidden_records(file)?;
        let before = self.completion(file);
        let date = (self.clock)();
        let mut outcome = BulkOutcome::default();

        for record in pending {
            match record.status() {
                FunctionStatus::Reviewed => {}
                FunctionStatus::Unread => outcome.rejected += 1,
                FunctionStatus::Read => {
                    self.store.set_function_flags(
                        file,
                        &record.id,
                        FunctionFlags {
                            is_reviewed: true,
                            ..record.flags()
                        },
                    )?;
                    self.store.progress().record_function_reviewed_on(
                        date,
                        file,
                        &record.name,
                        record.line_count(),
                    );
                    outcome.changed += 1;
                }
            }
        }

        outcome.completed = self.log_completion(file, before);
        Ok(outcome)
    }

    fn non_hidden_records(&self, file: &str) -> Result<Vec<FunctionRecord>, AuditError> {
        Ok(self
            .store
            .file(file)
            .ok_or_else(|| AuditError::FileNotTracked(file.to_string()))?
            .non_hidden()
            .cloned()
            .collect())
    }

    /// Active filters
    #[must_use]
    pub const fn filters(&self) -> &FunctionFilters {
        self.store.filters()
    }

    /// Replace the filters; an empty status selection becomes the default
    pub fn set_filters(
        &mut self,
        statuses: impl IntoIterator<Item = FunctionStatus>,
        tags: impl IntoIterator<Item = FunctionTag>,
    ) {
        self.store.set_filters(FunctionFilters::new(statuses, tags));
    }

    /// Files with at least one visible function under the active filters
    #[must_use]
    pub fn visible_files(&self) -> Vec<&TrackedFile> {
        filter::visible_files(self.store.files().values(), self.store.filters())
    }

    /// Visible functions of one file under the active filters
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked`.
    pub fn visible_functions(&self, file: &str) -> Result<Vec<&FunctionRecord>, AuditError> {
        let tracked = self
            .store
            .file(file)
            .ok_or_else(|| AuditError::FileNotTracked(file.to_string()))?;
        Ok(filter::visible_functions(tracked, self.store.filters()).collect())
    }

    /// Daily report plus current totals
    #[must_use]
    pub fn progress_report(&self) -> ProgressReport {
        progress_report(self.store.state())
    }

    /// Reset the whole state
    pub fn clear_all(&mut self) {
        self.store.clear_all();
    }

    /// Queue the current state for writing
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized.
    pub fn save(&mut self) -> Result<PendingSave> {
        self.store.save()
    }

    /// Write the current state and wait for the outcome
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_and_wait(&mut self) -> Result<()> {
        self.store.save_and_wait()
    }
}
