//! Exact duplicate grouping.

use crate::models::{DuplicateGroup, PoolEntry};
use std::collections::HashMap;

/// Label prefix of exact duplicate groups.
pub const EXACT_LABEL: &str = "[exact]";

/// Groups pool entries whose raw text is identical.
///
/// Only texts shared by two or more distinct notes form a group. Blank
/// values are never duplicates of each other. Groups are labelled
/// `[exact] <value>` and come out in order of first appearance.
///
/// # Example
///
/// ```rust
/// use cousins::models::{NoteId, PoolEntry};
/// use cousins::services::exact_duplicates;
///
/// let pool = vec![
///     PoolEntry::new(NoteId::new(1), "Paris"),
///     PoolEntry::new(NoteId::new(2), "Rome"),
///     PoolEntry::new(NoteId::new(3), "Paris"),
/// ];
/// let groups = exact_duplicates(&pool);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].label, "[exact] Paris");
/// ```
#[must_use]
pub fn exact_duplicates(pool: &[PoolEntry]) -> Vec<DuplicateGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for entry in pool.iter().filter(|entry| !entry.text.trim().is_empty()) {
        let idx = *index.entry(entry.text.as_str()).or_insert_with(|| {
            groups.push(DuplicateGroup::new(format!("{EXACT_LABEL} {}", entry.text)));
            groups.len() - 1
        });
        groups[idx].note_ids.insert(entry.id);
    }
    groups.retain(|group| group.len() > 1);
    groups
}

/// Combines exact and fuzzy reports, exact groups first.
#[must_use]
pub fn merge_reports(
    exact: Vec<DuplicateGroup>,
    fuzzy: Vec<DuplicateGroup>,
) -> Vec<DuplicateGroup> {
    let mut merged = exact;
    merged.extend(fuzzy);
    merged
}
