//! Collaborator traits.
//!
//! The evaluator never touches a host directly. Rules come through a
//! [`RuleStore`], text pools through a [`PoolProvider`], and results leave
//! through a [`SuppressionSink`] or a [`ReportingSink`].

use crate::Result;
use crate::models::{DuplicateGroup, FieldRef, NoteId, NoteTypeId, PoolEntry};
use crate::storage::codec::RawRuleRow;
use std::collections::BTreeSet;

/// Trait for rule persistence backends.
///
/// Stores hand out raw JSON rows rather than decoded rules so that one
/// corrupt row can be skipped without losing the rest.
pub trait RuleStore {
    /// Loads the persisted rows in stored order.
    ///
    /// A store with nothing saved yet returns an empty list.
    fn load_rows(&self) -> Result<Vec<serde_json::Value>>;

    /// Replaces the persisted rows.
    fn save_rows(&mut self, rows: &[RawRuleRow]) -> Result<()>;
}

/// Trait for sources of text pools.
pub trait PoolProvider {
    /// Returns `(id, raw text)` for every relevant note of the field's type
    /// that has the field.
    fn pool(&self, field: &FieldRef) -> Result<Vec<PoolEntry>>;

    /// Returns the note types that have a field with this name, in first
    /// seen order. Providers that cannot enumerate types return none.
    fn types_with_field(&self, _field: &str) -> Result<Vec<NoteTypeId>> {
        Ok(Vec::new())
    }
}

/// Receives the notes to hold back after a review.
pub trait SuppressionSink {
    /// Suppresses the given notes.
    fn suppress(&mut self, ids: &BTreeSet<NoteId>) -> Result<()>;
}

/// Receives duplicate groups for display.
pub trait ReportingSink {
    /// Reports the groups in order.
    fn report(&mut self, groups: &[DuplicateGroup]) -> Result<()>;
}
