//! Visibility predicates over tracked functions and files.
//!
//! Statuses combine with OR among themselves, tags combine with OR among
//! themselves, and the two groups combine with AND. Hidden functions never
//! reach the predicate.

use crate::model::{FunctionFilters, FunctionRecord, FunctionTag, TrackedFile};

/// Status and tag predicate for a single record
///
/// Does not look at `is_hidden`; callers drop hidden records first.
#[must_use]
pub fn matches(record: &FunctionRecord, filters: &FunctionFilters) -> bool {
    let status_ok = filters.statuses.is_empty() || filters.statuses.contains(&record.status());

    let tag_ok = filters.tags.is_empty()
        || (filters.tags.contains(&FunctionTag::Entrypoint) && record.is_entrypoint)
        || (filters.tags.contains(&FunctionTag::Admin) && record.is_admin);

    status_ok && tag_ok
}

/// Non-hidden functions of `file` that pass the filters
pub fn visible_functions<'a>(
    file: &'a TrackedFile,
    filters: &'a FunctionFilters,
) -> impl Iterator<Item = &'a FunctionRecord> + 'a {
    file.non_hidden().filter(move |f| matches(f, filters))
}

/// Whether `file` has at least one visible function
#[must_use]
pub fn is_file_visible(file: &TrackedFile, filters: &FunctionFilters) -> bool {
    visible_functions(file, filters).next().is_some()
}

/// Files with at least one visible function, in input order
pub fn visible_files<'a, I>(files: I, filters: &FunctionFilters) -> Vec<&'a TrackedFile>
where
    I: IntoIterator<Item = &'a TrackedFile>,
{
    files
        .into_iter()
        .filter(|file| is_file_visible(file, filters))
        .collect()
}

/// Whether `file` takes part in progress totals (filter-independent)
#[must_use]
pub fn counts_towards_progress(file: &TrackedFile) -> bool {
    file.has_visible_functions()
}
