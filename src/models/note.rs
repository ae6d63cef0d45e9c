//! Notes, note identifiers and text pools.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    /// Creates a new note ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NoteId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of a note type (the host calls these models).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteTypeId(i64);

impl NoteTypeId {
    /// Creates a new note type ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NoteTypeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A named field on a note type.
///
/// Rules name one `FieldRef` as their source and one as their target; pool
/// providers are asked for pools by `FieldRef`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    /// The note type the field belongs to.
    pub type_id: NoteTypeId,
    /// The field name.
    pub field: String,
}

impl FieldRef {
    /// Creates a new field reference.
    #[must_use]
    pub fn new(type_id: NoteTypeId, field: impl Into<String>) -> Self {
        Self {
            type_id,
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_id, self.field)
    }
}

/// One entry of a text pool: a note id and the raw text of one of its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// The note the text was taken from.
    pub id: NoteId,
    /// The raw field value.
    pub text: String,
}

impl PoolEntry {
    /// Creates a new pool entry.
    #[must_use]
    pub fn new(id: NoteId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// A note: an id, a type and its named fields.
///
/// # Example
///
/// ```rust
/// use cousins::models::{Note, NoteTypeId};
///
/// let note = Note::new(7, NoteTypeId::new(1))
///     .with_field("Front", "capital of France")
///     .with_field("Back", "Paris");
///
/// assert_eq!(note.field("Back"), Some("Paris"));
/// assert_eq!(note.field("Extra"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier.
    pub id: NoteId,
    /// The note type.
    pub type_id: NoteTypeId,
    /// Field values keyed by field name.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Note {
    /// Creates a note with no fields.
    #[must_use]
    pub fn new(id: i64, type_id: NoteTypeId) -> Self {
        Self {
            id: NoteId::new(id),
            type_id,
            fields: BTreeMap::new(),
        }
    }

    /// Builder method to set a field value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the value of a field, if the note has it.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Returns true if this note has the given type.
    #[must_use]
    pub fn is_type(&self, type_id: NoteTypeId) -> bool {
        self.type_id == type_id
    }
}
