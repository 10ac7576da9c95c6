//! Entity model for the review state snapshot.
//!
//! Every type here serializes to the camelCase JSON layout of the persisted
//! state file. Loading never deserializes these types directly from disk;
//! it goes through [`crate::store::normalize`] so that a damaged or older
//! document degrades field by field instead of failing as a whole.

use crate::scope::ScopeSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Schema version written into every snapshot
pub const STATE_VERSION: u32 = 1;

/// Review status of a single function, derived from its flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionStatus {
    /// Not opened yet
    Unread,
    /// Read at least once
    Read,
    /// Fully reviewed
    Reviewed,
}

impl FunctionStatus {
    /// All statuses, in state-machine order
    pub const ALL: [Self; 3] = [Self::Unread, Self::Read, Self::Reviewed];

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Reviewed => "reviewed",
        }
    }

    /// Parse a wire name, returning `None` for anything unknown
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unread" => Some(Self::Unread),
            "read" => Some(Self::Read),
            "reviewed" => Some(Self::Reviewed),
            _ => None,
        }
    }
}

impl fmt::Display for FunctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-assigned classification tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionTag {
    /// Externally reachable attack surface
    Entrypoint,
    /// Privileged or security-sensitive
    Admin,
}

impl FunctionTag {
    /// All tags
    pub const ALL: [Self; 2] = [Self::Entrypoint, Self::Admin];

    /// Wire name of the tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entrypoint => "entrypoint",
            Self::Admin => "admin",
        }
    }

    /// Parse a wire name, returning `None` for anything unknown
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "entrypoint" => Some(Self::Entrypoint),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for FunctionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user-set review flags of a function
///
/// This is the exact set of fields that survives re-extraction of a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionFlags {
    /// 0 or 1
    pub read_count: u32,
    /// Fully reviewed
    pub is_reviewed: bool,
    /// Tagged as entrypoint
    pub is_entrypoint: bool,
    /// Tagged as admin
    pub is_admin: bool,
    /// Hidden from counting and display
    pub is_hidden: bool,
}

/// One tracked function, method or constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionRecord {
    /// Derived from file path, name and start line
    pub id: String,
    /// Display name without language decoration
    pub name: String,
    /// Absolute path of the owning file
    pub file_path: String,
    /// First line, 0-indexed
    pub start_line: u32,
    /// Last line, 0-indexed, never below `start_line`
    pub end_line: u32,
    /// 0 = unread, 1 = read
    pub read_count: u32,
    /// Fully reviewed
    pub is_reviewed: bool,
    /// Tagged as entrypoint
    pub is_entrypoint: bool,
    /// Tagged as admin
    pub is_admin: bool,
    /// Hidden from counting and display
    pub is_hidden: bool,
}

impl FunctionRecord {
    /// Create an unread record with all flags cleared
    ///
    /// `end_line` is clamped so that the span is never inverted.
    #[must_use]
    pub fn new(file_path: &str, name: &str, start_line: u32, end_line: u32) -> Self {
        Self {
            id: Self::derive_id(file_path, name, start_line),
            name: name.to_string(),
            file_path: file_path.to_string(),
            start_line,
            end_line: end_line.max(start_line),
            read_count: 0,
            is_reviewed: false,
            is_entrypoint: false,
            is_admin: false,
            is_hidden: false,
        }
    }

    /// Identity used for exact matching across re-extractions
    #[must_use]
    pub fn derive_id(file_path: &str, name: &str, start_line: u32) -> String {
        format!("{file_path}:{name}:{start_line}")
    }

    /// Current status derived from the flags
    #[must_use]
    pub const fn status(&self) -> FunctionStatus {
        if self.is_reviewed {
            FunctionStatus::Reviewed
        } else if self.read_count > 0 {
            FunctionStatus::Read
        } else {
            FunctionStatus::Unread
        }
    }

    /// Whether the function counts as read (reviewed implies read)
    #[must_use]
    pub const fn is_read(&self) -> bool {
        !matches!(self.status(), FunctionStatus::Unread)
    }

    /// Number of lines covered by the span
    #[must_use]
    pub const fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line).saturating_add(1)
    }

    /// Snapshot of the user-set flags
    #[must_use]
    pub const fn flags(&self) -> FunctionFlags {
        FunctionFlags {
            read_count: self.read_count,
            is_reviewed: self.is_reviewed,
            is_entrypoint: self.is_entrypoint,
            is_admin: self.is_admin,
            is_hidden: self.is_hidden,
        }
    }

    /// Overwrite the user-set flags, leaving identity and span untouched
    pub const fn set_flags(&mut self, flags: FunctionFlags) {
        self.read_count = flags.read_count;
        self.is_reviewed = flags.is_reviewed;
        self.is_entrypoint = flags.is_entrypoint;
        self.is_admin = flags.is_admin;
        self.is_hidden = flags.is_hidden;
    }

    /// Whether the record carries the given tag
    #[must_use]
    pub const fn has_tag(&self, tag: FunctionTag) -> bool {
        match tag {
            FunctionTag::Entrypoint => self.is_entrypoint,
            FunctionTag::Admin => self.is_admin,
        }
    }
}

/// A file in scope together with its extracted functions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedFile {
    /// Absolute path, primary key
    pub file_path: String,
    /// Path relative to the workspace root, for display
    pub relative_path: String,
    /// Functions, unique by id
    pub functions: Vec<FunctionRecord>,
}

impl TrackedFile {
    /// Create a tracked file with no functions
    #[must_use]
    pub fn new(file_path: &str, relative_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            relative_path: relative_path.to_string(),
            functions: Vec::new(),
        }
    }

    /// Look up a function by id
    #[must_use]
    pub fn function(&self, id: &str) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| f.id == id)
    }

    /// Look up a function by id for mutation
    pub fn function_mut(&mut self, id: &str) -> Option<&mut FunctionRecord> {
        self.functions.iter_mut().find(|f| f.id == id)
    }

    /// Resolve a user-supplied reference: an id first, then a name
    #[must_use]
    pub fn find_function(&self, reference: &str) -> Option<&FunctionRecord> {
        self.function(reference)
            .or_else(|| self.functions.iter().find(|f| f.name == reference))
    }

    /// Functions that take part in counting and display
    pub fn non_hidden(&self) -> impl Iterator<Item = &FunctionRecord> {
        self.functions.iter().filter(|f| !f.is_hidden)
    }

    /// Whether any non-hidden function exists
    #[must_use]
    pub fn has_visible_functions(&self) -> bool {
        self.non_hidden().next().is_some()
    }

    /// Every non-hidden function is read (a file without any is never complete)
    #[must_use]
    pub fn is_fully_read(&self) -> bool {
        self.has_visible_functions() && self.non_hidden().all(FunctionRecord::is_read)
    }

    /// Every non-hidden function is reviewed (a file without any is never complete)
    #[must_use]
    pub fn is_fully_reviewed(&self) -> bool {
        self.has_visible_functions() && self.non_hidden().all(|f| f.is_reviewed)
    }
}

/// Active status and tag filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionFilters {
    /// Selected statuses; matching any of them passes
    pub statuses: BTreeSet<FunctionStatus>,
    /// Selected tags; empty means tags are ignored
    pub tags: BTreeSet<FunctionTag>,
}

impl FunctionFilters {
    /// Build filters from a user edit
    ///
    /// An empty status selection is replaced by the default selection.
    #[must_use]
    pub fn new(
        statuses: impl IntoIterator<Item = FunctionStatus>,
        tags: impl IntoIterator<Item = FunctionTag>,
    ) -> Self {
        let statuses: BTreeSet<_> = statuses.into_iter().collect();
        Self {
            statuses: if statuses.is_empty() {
                Self::default_statuses()
            } else {
                statuses
            },
            tags: tags.into_iter().collect(),
        }
    }

    /// All three statuses
    #[must_use]
    pub fn default_statuses() -> BTreeSet<FunctionStatus> {
        FunctionStatus::ALL.into_iter().collect()
    }

    /// Whether the filters are the default (everything visible)
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for FunctionFilters {
    fn default() -> Self {
        Self {
            statuses: Self::default_statuses(),
            tags: BTreeSet::new(),
        }
    }
}

/// Kind of logged progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    /// A function went from unread to read
    FunctionRead,
    /// A function went from read to reviewed
    FunctionReviewed,
    /// Every non-hidden function of a file became read
    FileRead,
    /// Every non-hidden function of a file became reviewed
    FileReviewed,
}

impl ActionType {
    /// Wire name of the action type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FunctionRead => "functionRead",
            Self::FunctionReviewed => "functionReviewed",
            Self::FileRead => "fileRead",
            Self::FileReviewed => "fileReviewed",
        }
    }

    /// Parse a wire name, returning `None` for anything unknown
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "functionRead" => Some(Self::FunctionRead),
            "functionReviewed" => Some(Self::FunctionReviewed),
            "fileRead" => Some(Self::FileRead),
            "fileReviewed" => Some(Self::FileReviewed),
            _ => None,
        }
    }
}

/// One atomic progress event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressAction {
    /// Event kind
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// File the event belongs to
    pub file_path: String,
    /// Function name, for function events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Lines covered, for function events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_count: Option<u32>,
}

/// Counters and action log of one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgressEntry {
    /// Local calendar date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Functions marked read
    pub functions_read: u64,
    /// Functions marked reviewed
    pub functions_reviewed: u64,
    /// Sum of line counts of functions marked read
    pub lines_read: u64,
    /// Sum of line counts of functions marked reviewed
    pub lines_reviewed: u64,
    /// Files that became fully read
    pub files_read: u64,
    /// Files that became fully reviewed
    pub files_reviewed: u64,
    /// Actions in the order they were recorded
    pub actions: Vec<ProgressAction>,
}

impl DailyProgressEntry {
    /// Empty entry for a date
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self {
            date,
            functions_read: 0,
            functions_reviewed: 0,
            lines_read: 0,
            lines_reviewed: 0,
            files_read: 0,
            files_reviewed: 0,
            actions: Vec::new(),
        }
    }

    /// Actions of a single type, in recorded order
    pub fn actions_of(&self, action_type: ActionType) -> impl Iterator<Item = &ProgressAction> {
        self.actions
            .iter()
            .filter(move |a| a.action_type == action_type)
    }
}

/// The full persisted snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootState {
    /// Schema version
    pub version: u32,
    /// Scope and exclusion paths (`scopePaths` / `excludedPaths`)
    #[serde(flatten)]
    pub scope: ScopeSet,
    /// Active filters
    pub function_filters: FunctionFilters,
    /// Tracked files keyed by absolute path
    pub files: BTreeMap<String, TrackedFile>,
    /// One entry per date, in recording order
    pub progress_history: Vec<DailyProgressEntry>,
    /// Milliseconds since the Unix epoch of the last save
    pub last_modified: i64,
}

impl Default for RootState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            scope: ScopeSet::default(),
            function_filters: FunctionFilters::default(),
            files: BTreeMap::new(),
            progress_history: Vec::new(),
            last_modified: 0,
        }
    }
}
