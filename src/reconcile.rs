//! Merge freshly extracted function spans with previously recorded review flags.
//!
//! Extraction runs again on every save of a file, and a line inserted above a
//! function shifts its start line and therefore its id. Matching on id alone
//! would reset review progress on every such edit, so each candidate is
//! matched in two steps:
//!
//! 1. by id (same name and same start line);
//! 2. by name alone.
//!
//! A matched candidate inherits exactly the fields in [`FunctionFlags`];
//! name, span and id always come from the candidate. Previous records that
//! no candidate claims are dropped.
//!
//! Two functions sharing a name in one file are matched to the first previous
//! record with that name. This is a heuristic for the common single-definition
//! case, not a correctness guarantee.

use crate::model::{FunctionFlags, FunctionRecord};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Counts describing what a reconciliation did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Candidates that kept flags through an id match
    pub matched_by_id: usize,
    /// Candidates that kept flags through a name match
    pub matched_by_name: usize,
    /// Candidates with no previous record
    pub added: usize,
    /// Previous records that no candidate claimed
    pub dropped: usize,
}

impl ReconcileSummary {
    /// Whether the function list changed shape (new or dropped functions)
    #[must_use]
    pub const fn changed_shape(&self) -> bool {
        self.added > 0 || self.dropped > 0
    }
}

/// Produce the new authoritative function list for a file
#[must_use]
pub fn reconcile(previous: &[FunctionRecord], candidates: Vec<FunctionRecord>) -> Vec<FunctionRecord> {
    reconcile_with_summary(previous, candidates).0
}

/// Like [`reconcile`], also reporting how each candidate was matched
#[must_use]
pub fn reconcile_with_summary(
    previous: &[FunctionRecord],
    candidates: Vec<FunctionRecord>,
) -> (Vec<FunctionRecord>, ReconcileSummary) {
    let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(previous.len());
    let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(previous.len());
    for (index, record) in previous.iter().enumerate() {
        by_id.entry(record.id.as_str()).or_insert(index);
        by_name.entry(record.name.as_str()).or_insert(index);
    }

    let mut summary = ReconcileSummary::default();
    let mut claimed: HashSet<usize> = HashSet::with_capacity(previous.len());
    let mut seen_ids: HashSet<String> = HashSet::with_capacity(candidates.len());
    let mut merged = Vec::with_capacity(candidates.len());

    for mut candidate in candidates {
        if !seen_ids.insert(candidate.id.clone()) {
            debug!(id = %candidate.id, "Skipping duplicate candidate");
            continue;
        }

        let matched = if let Some(&index) = by_id.get(candidate.id.as_str()) {
            summary.matched_by_id += 1;
            Some(index)
        } else if let Some(&index) = by_name.get(candidate.name.as_str()) {
            summary.matched_by_name += 1;
            Some(index)
        } else {
            summary.added += 1;
            None
        };

        let flags = match matched {
            Some(index) => {
                claimed.insert(index);
                previous[index].flags()
            }
            None => FunctionFlags::default(),
        };
        candidate.set_flags(flags);
        merged.push(candidate);
    }

    summary.dropped = previous.len() - claimed.len();
    (merged, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "/repo/src/Vault.sol";

    fn reviewed(name: &str, start: u32) -> FunctionRecord {
        let mut record = FunctionRecord::new(FILE, name, start, start + 5);
        record.read_count = 1;
        record.is_reviewed = true;
        record
    }

    #[test]
    fn test_shifted_function_keeps_flags() {
        let previous = vec![reviewed("f", 10)];
        let candidates = vec![FunctionRecord::new(FILE, "f", 40, 52)];

        let (merged, summary) = reconcile_with_summary(&previous, candidates);

        assert_eq!(merged.len(), 1);
        assert!(merged[0].is_reviewed);
        assert_eq!(merged[0].read_count, 1);
        assert_eq!(merged[0].start_line, 40);
        assert_eq!(merged[0].end_line, 52);
        assert_eq!(merged[0].id, FunctionRecord::derive_id(FILE, "f", 40));
        assert_eq!(summary.matched_by_name, 1);
    }

    #[test]
    fn test_exact_match_takes_new_span() {
        let mut previous = reviewed("deposit", 3);
        previous.is_admin = true;
        previous.is_hidden = true;
        let candidates = vec![FunctionRecord::new(FILE, "deposit", 3, 30)];

        let (merged, summary) = reconcile_with_summary(&[previous], candidates);

        assert_eq!(summary.matched_by_id, 1);
        assert_eq!(merged[0].end_line, 30);
        assert!(merged[0].is_admin);
        assert!(merged[0].is_hidden);
        assert!(merged[0].is_reviewed);
    }

    #[test]
    fn test_stale_records_dropped() {
        let previous = vec![reviewed("gone", 1), reviewed("kept", 10)];
        let candidates = vec![FunctionRecord::new(FILE, "kept", 10, 12)];

        let (merged, summary) = reconcile_with_summary(&previous, candidates);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "kept");
        assert_eq!(summary.dropped, 1);
    }

    #[test]
    fn test_new_candidate_has_default_flags() {
        let previous = vec![reviewed("old", 1)];
        let mut candidate = FunctionRecord::new(FILE, "fresh", 20, 25);
        candidate.is_admin = true;

        let merged = reconcile(&previous, vec![candidate]);

        assert_eq!(merged[0].flags(), FunctionFlags::default());
    }

    #[test]
    fn test_id_match_preferred_over_name_match() {
        let mut first = FunctionRecord::new(FILE, "f", 1, 2);
        first.is_entrypoint = true;
        let mut second = FunctionRecord::new(FILE, "f", 20, 22);
        second.is_admin = true;

        let merged = reconcile(&[first, second], vec![FunctionRecord::new(FILE, "f", 20, 24)]);

        assert!(merged[0].is_admin);
        assert!(!merged[0].is_entrypoint);
    }

    #[test]
    fn test_same_name_falls_back_to_first_definition() {
        let mut first = FunctionRecord::new(FILE, "f", 1, 2);
        first.is_entrypoint = true;
        let second = FunctionRecord::new(FILE, "f", 20, 22);

        let merged = reconcile(&[first, second], vec![FunctionRecord::new(FILE, "f", 7, 9)]);

        assert!(merged[0].is_entrypoint);
    }

    #[test]
    fn test_duplicate_candidates_collapsed() {
        let candidates = vec![
            FunctionRecord::new(FILE, "f", 1, 2),
            FunctionRecord::new(FILE, "f", 1, 9),
        ];
        let merged = reconcile(&[], candidates);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].end_line, 2);
    }

    #[test]
    fn test_empty_candidates_drop_everything() {
        let (merged, summary) = reconcile_with_summary(&[reviewed("f", 1)], Vec::new());
        assert!(merged.is_empty());
        assert_eq!(summary.dropped, 1);
        assert!(summary.changed_shape());
    }
}
