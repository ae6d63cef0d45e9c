//! Data models for cousins.
//!
//! Notes and pools come from the host collection; rules come from the rule
//! store; duplicate groups are what grouping mode hands to a reporting sink.

mod group;
mod note;
mod rule;

pub use group::DuplicateGroup;
pub use note::{FieldRef, Note, NoteId, NoteTypeId, PoolEntry};
pub use rule::{Comparator, MatchRule, RuleSet};
