//! Owner of the review state for one workspace.
//!
//! A [`StateStore`] holds the in-memory [`RootState`] and the queue that
//! persists it. Loading never fails: a missing, unreadable or malformed
//! snapshot yields a fresh default state and a warning in the log. Every
//! query and mutation below touches only the collection it names.

pub mod normalize;
pub mod persist;

use crate::error::AuditError;
use crate::model::{
    DailyProgressEntry, FunctionFilters, FunctionFlags, FunctionRecord, RootState, TrackedFile,
};
use crate::progress::ProgressTracker;
use crate::reconcile::{ReconcileSummary, reconcile_with_summary};
use crate::scope::ScopeSet;
use crate::utils::current_timestamp_millis;
use crate::utils::paths::display_relative;
use anyhow::{Context, Result};
use persist::{PendingSave, SaveQueue};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span, warn};

/// Outcome of [`StateStore::remove_from_scope`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRemoval {
    /// An exact scope entry was deleted; these files were dropped with it
    RemovedEntry {
        /// Absolute paths of dropped tracked files
        dropped: Vec<String>,
    },
    /// The path was covered by a folder entry and is now excluded
    Excluded,
    /// The path was not in scope; nothing changed
    NotInScope,
}

/// In-memory review state plus its persistence queue
pub struct StateStore {
    /// Snapshot location
    state_path: PathBuf,
    /// Root used for display paths
    workspace_root: PathBuf,
    /// Current state
    state: RootState,
    /// Serialized writer
    queue: SaveQueue,
}

impl StateStore {
    /// Load the snapshot at `state_path` and start its save queue
    ///
    /// # Errors
    ///
    /// Returns an error only if the writer thread cannot be started; a bad
    /// snapshot is replaced by a default state.
    pub fn open(state_path: PathBuf, workspace_root: PathBuf) -> Result<Self> {
        let state = Self::load(&state_path, &workspace_root);
        let queue = SaveQueue::start(state_path.clone())
            .with_context(|| format!("Failed to open state at {}", state_path.display()))?;
        Ok(Self {
            state_path,
            workspace_root,
            state,
            queue,
        })
    }

    /// Read and normalize a snapshot, falling back to the default state
    #[must_use]
    pub fn load(path: &Path, workspace_root: &Path) -> RootState {
        let span = span!(Level::DEBUG, "load_state", path = %path.display());
        let _guard = span.enter();

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file yet, starting fresh");
                return RootState::default();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read state file, starting fresh");
                return RootState::default();
            }
        };

        let value: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "State file is not valid JSON, starting fresh");
                return RootState::default();
            }
        };

        normalize::normalize_state(&value, workspace_root).map_or_else(RootState::default, |state| {
            debug!(
                files = state.files.len(),
                scope_paths = state.scope.scope_paths.len(),
                days = state.progress_history.len(),
                "State loaded"
            );
            state
        })
    }

    /// Snapshot location
    #[must_use]
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Root used for display paths
    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Whole current state
    #[must_use]
    pub const fn state(&self) -> &RootState {
        &self.state
    }

    /// Scope and exclusion lists
    #[must_use]
    pub const fn scope(&self) -> &ScopeSet {
        &self.state.scope
    }

    /// Inclusion query
    #[must_use]
    pub fn is_in_scope(&self, path: &str) -> bool {
        self.state.scope.is_in_scope(path)
    }

    /// Bring a path into scope; see [`ScopeSet::add_scope_path`]
    pub fn add_scope_path(&mut self, path: &str) -> bool {
        let changed = self.state.scope.add_scope_path(path);
        if changed {
            debug!(path, "Scope path added");
        }
        changed
    }

    /// Delete an exact scope entry and drop the files it no longer covers
    ///
    /// Returns `None` if there was no such entry, otherwise the dropped files.
    pub fn remove_scope_path(&mut self, path: &str) -> Option<Vec<String>> {
        if !self.state.scope.remove_scope_path(path) {
            return None;
        }
        let dropped = self.prune_out_of_scope();
        debug!(path, dropped = dropped.len(), "Scope path removed");
        Some(dropped)
    }

    /// Exclude a file and drop it from tracking
    pub fn add_excluded_path(&mut self, path: &str) -> bool {
        let changed = self.state.scope.add_excluded_path(path);
        if changed {
            let dropped = self.prune_out_of_scope();
            debug!(path, dropped = dropped.len(), "Path excluded");
        }
        changed
    }

    /// Lift an exclusion
    pub fn remove_excluded_path(&mut self, path: &str) -> bool {
        self.state.scope.remove_excluded_path(path)
    }

    /// Take a path out of scope the way the user means it
    ///
    /// An exact scope entry is deleted; a path covered by a folder entry is
    /// excluded instead.
    pub fn remove_from_scope(&mut self, path: &str) -> ScopeRemoval {
        if let Some(dropped) = self.remove_scope_path(path) {
            return ScopeRemoval::RemovedEntry { dropped };
        }
        if self.state.scope.is_in_scope(path) {
            self.add_excluded_path(path);
            return ScopeRemoval::Excluded;
        }
        ScopeRemoval::NotInScope
    }

    /// Remove tracked files that fail the inclusion query
    fn prune_out_of_scope(&mut self) -> Vec<String> {
        let scope = &self.state.scope;
        let dropped: Vec<String> = self
            .state
            .files
            .keys()
            .filter(|path| !scope.is_in_scope(path))
            .cloned()
            .collect();
        for path in &dropped {
            self.state.files.remove(path);
        }
        dropped
    }

    /// All tracked files keyed by absolute path
    #[must_use]
    pub const fn files(&self) -> &BTreeMap<String, TrackedFile> {
        &self.state.files
    }

    /// One tracked file
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&TrackedFile> {
        self.state.files.get(path)
    }

    /// Track a file with no functions if it is not tracked yet
    ///
    /// Returns `true` if the file was inserted.
    pub fn ensure_file(&mut self, path: &str) -> bool {
        if self.state.files.contains_key(path) {
            return false;
        }
        let relative = display_relative(Path::new(path), &self.workspace_root);
        self.state
            .files
            .insert(path.to_string(), TrackedFile::new(path, &relative));
        true
    }

    /// Replace a file's functions with freshly extracted ones, carrying flags over
    pub fn replace_functions(
        &mut self,
        path: &str,
        candidates: Vec<FunctionRecord>,
    ) -> ReconcileSummary {
        self.ensure_file(path);
        let Some(file) = self.state.files.get_mut(path) else {
            return ReconcileSummary::default();
        };

        let (functions, summary) = reconcile_with_summary(&file.functions, candidates);
        file.functions = functions;
        debug!(
            file = path,
            by_id = summary.matched_by_id,
            by_name = summary.matched_by_name,
            added = summary.added,
            dropped = summary.dropped,
            "Functions reconciled"
        );
        summary
    }

    /// Stop tracking a file
    pub fn remove_file(&mut self, path: &str) -> Option<TrackedFile> {
        self.state.files.remove(path)
    }

    /// A function by id
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked` or `FunctionNotFound`.
    pub fn function(&self, file: &str, id: &str) -> Result<&FunctionRecord, AuditError> {
        self.state
            .files
            .get(file)
            .ok_or_else(|| AuditError::FileNotTracked(file.to_string()))?
            .function(id)
            .ok_or_else(|| AuditError::FunctionNotFound {
                file: file.to_string(),
                function: id.to_string(),
            })
    }

    /// Overwrite a function's flags, returning the previous ones
    ///
    /// # Errors
    ///
    /// Returns `FileNotTracked` or `FunctionNotFound`.
    pub fn set_function_flags(
        &mut self,
        file: &str,
        id: &str,
        flags: FunctionFlags,
    ) -> Result<FunctionFlags, AuditError> {
        let record = self
            .state
            .files
            .get_mut(file)
            .ok_or_else(|| AuditError::FileNotTracked(file.to_string()))?
            .function_mut(id)
            .ok_or_else(|| AuditError::FunctionNotFound {
                file: file.to_string(),
                function: id.to_string(),
            })?;
        let previous = record.flags();
        record.set_flags(flags);
        Ok(previous)
    }

    /// Active filters
    #[must_use]
    pub const fn filters(&self) -> &FunctionFilters {
        &self.state.function_filters
    }

    /// Replace the active filters
    pub fn set_filters(&mut self, filters: FunctionFilters) {
        self.state.function_filters = filters;
    }

    /// Daily progress entries in recording order
    #[must_use]
    pub fn progress_history(&self) -> &[DailyProgressEntry] {
        &self.state.progress_history
    }

    /// Recorder appending to the progress history
    pub const fn progress(&mut self) -> ProgressTracker<'_> {
        ProgressTracker::new(&mut self.state.progress_history)
    }

    /// Reset everything to the default state
    pub fn clear_all(&mut self) {
        info!(path = %self.state_path.display(), "Clearing review state");
        self.state = RootState::default();
    }

    /// Queue the current state for writing
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized.
    pub fn save(&mut self) -> Result<PendingSave> {
        self.state.last_modified = current_timestamp_millis();
        let bytes =
            serde_json::to_vec_pretty(&self.state).context("Failed to serialize review state")?;
        Ok(self.queue.enqueue(bytes))
    }

    /// Queue the current state and block until it is written
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_and_wait(&mut self) -> Result<()> {
        self.save()?.wait()?;
        Ok(())
    }
}
