//! Note collections loaded from CSV or JSON files.
//!
//! Two file formats are understood, chosen by extension:
//!
//! - **CSV** (`.csv`): one row per field, header `id,type_id,field,value`
//! - **JSON** (`.json`): `[{"id": 1, "type_id": 1, "fields": {"Back": "..."}}]`

use crate::matching::strip_html;
use crate::models::{FieldRef, Note, NoteId, NoteTypeId, PoolEntry};
use crate::storage::traits::PoolProvider;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Note file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteFormat {
    /// One row per note field.
    Csv,
    /// A list of note objects.
    Json,
}

impl NoteFormat {
    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// An in-memory note collection that serves as a pool provider.
///
/// Every note of the requested type that has the requested field is part of
/// the pool. With [`with_html_stripped`](Self::with_html_stripped) the pool
/// texts have their HTML removed first, which is what duplicate reports want.
#[derive(Debug, Clone, Default)]
pub struct NoteCollection {
    notes: Vec<Note>,
    index: HashMap<NoteId, usize>,
    strip_html: bool,
}

impl NoteCollection {
    /// Creates a collection. A later note with a repeated id replaces the
    /// earlier one.
    #[must_use]
    pub fn new(notes: Vec<Note>) -> Self {
        let mut collection = Self::default();
        for note in notes {
            collection.insert(note);
        }
        collection
    }

    fn insert(&mut self, note: Note) {
        if let Some(&idx) = self.index.get(&note.id) {
            self.notes[idx] = note;
        } else {
            self.index.insert(note.id, self.notes.len());
            self.notes.push(note);
        }
    }

    /// Builder method to strip HTML from pool texts.
    #[must_use]
    pub const fn with_html_stripped(mut self, strip: bool) -> Self {
        self.strip_html = strip;
        self
    }

    /// Returns the note with the given id.
    #[must_use]
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.index.get(&id).map(|&idx| &self.notes[idx])
    }

    /// Returns the notes in load order.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Returns the number of notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Loads a collection from a `.csv` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unknown extension or bad
    /// content, and [`Error::OperationFailed`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let format = NoteFormat::from_path(path).ok_or_else(|| {
            Error::InvalidInput(format!(
                "unsupported note file (expected .csv or .json): {}",
                path.display()
            ))
        })?;
        let file = File::open(path).map_err(|e| Error::OperationFailed {
            operation: "open_note_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        let reader = BufReader::new(file);
        match format {
            NoteFormat::Csv => Self::from_csv(reader),
            NoteFormat::Json => Self::from_json(reader),
        }
    }

    /// Reads notes from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the content is not a list of notes.
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        let notes: Vec<Note> = serde_json::from_reader(reader)
            .map_err(|e| Error::InvalidInput(format!("invalid note JSON: {e}")))?;
        Ok(Self::new(notes))
    }

    /// Reads notes from CSV with an `id,type_id,field,value` header.
    ///
    /// Rows for the same id are merged into one note in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a column is missing, an id is not
    /// an integer, or one note id appears with two different types.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::OperationFailed {
                operation: "read_csv_headers".to_string(),
                cause: e.to_string(),
            })?
            .clone();
        let columns = CsvColumns::from_headers(&headers)?;

        let mut collection = Self::default();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| Error::OperationFailed {
                operation: "read_csv".to_string(),
                cause: e.to_string(),
            })?;
            let row = line + 2;
            let id = CsvColumns::parse_int(&record, columns.id, "id", row)?;
            let type_id =
                CsvColumns::parse_int(&record, columns.type_id, "type_id", row).map(NoteTypeId::new)?;
            let field = record.get(columns.field).unwrap_or_default().trim();
            let value = record.get(columns.value).unwrap_or_default();

            let note_id = NoteId::new(id);
            if let Some(&idx) = collection.index.get(&note_id) {
                let note = &mut collection.notes[idx];
                if note.type_id != type_id {
                    return Err(Error::InvalidInput(format!(
                        "row {row}: note {id} has type {} and {type_id}",
                        note.type_id
                    )));
                }
                note.fields.insert(field.to_string(), value.to_string());
            } else {
                collection.insert(Note::new(id, type_id).with_field(field, value));
            }
        }
        Ok(collection)
    }
}

/// Column positions of a note CSV.
struct CsvColumns {
    id: usize,
    type_id: usize,
    field: usize,
    value: usize,
}

impl CsvColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| Error::InvalidInput(format!("CSV is missing the '{name}' column")))
        };
        Ok(Self {
            id: find("id")?,
            type_id: find("type_id")?,
            field: find("field")?,
            value: find("value")?,
        })
    }

    fn parse_int(
        record: &csv::StringRecord,
        column: usize,
        name: &str,
        row: usize,
    ) -> Result<i64> {
        let raw = record.get(column).unwrap_or_default().trim();
        raw.parse().map_err(|_| {
            Error::InvalidInput(format!("row {row}: '{name}' is not an integer: '{raw}'"))
        })
    }
}

impl PoolProvider for NoteCollection {
    fn pool(&self, field: &FieldRef) -> Result<Vec<PoolEntry>> {
        Ok(self
            .notes
            .iter()
            .filter(|note| note.is_type(field.type_id))
            .filter_map(|note| {
                let text = note.field(&field.field)?;
                let text = if self.strip_html {
                    strip_html(text)
                } else {
                    text.to_string()
                };
                Some(PoolEntry::new(note.id, text))
            })
            .collect())
    }

    fn types_with_field(&self, field: &str) -> Result<Vec<NoteTypeId>> {
        let mut types: Vec<NoteTypeId> = Vec::new();
        for note in &self.notes {
            if note.field(field).is_some() && !types.contains(&note.type_id) {
                types.push(note.type_id);
            }
        }
        Ok(types)
    }
}
