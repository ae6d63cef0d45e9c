//! Duplicate groups produced by grouping mode.

use super::note::NoteId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A labelled set of notes that matched each other.
///
/// Labels combine the comparator name and the matched source value, for
/// example `[similarity] capital of france`, so reports stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Human-readable group label.
    pub label: String,
    /// Notes in the group.
    pub note_ids: BTreeSet<NoteId>,
}

impl DuplicateGroup {
    /// Creates an empty group with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            note_ids: BTreeSet::new(),
        }
    }

    /// Builder method to add notes to the group.
    #[must_use]
    pub fn with_notes(mut self, ids: impl IntoIterator<Item = NoteId>) -> Self {
        self.note_ids.extend(ids);
        self
    }

    /// Returns the number of notes in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.note_ids.len()
    }

    /// Returns true if the group has no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.note_ids.is_empty()
    }

    /// Returns true if the group contains the note.
    #[must_use]
    pub fn contains(&self, id: NoteId) -> bool {
        self.note_ids.contains(&id)
    }
}
