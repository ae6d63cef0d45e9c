//! JSON file rule store.
//!
//! The file is a JSON object used as a small key-value configuration blob.
//! Rules live under one key; every other key is left untouched on save, so
//! the file can be shared with other settings.
//!
//! ```json
//! {
//!   "anki_cousins": [[1, "Back", 1, "Back", "prefix", 0.65]],
//!   "other_setting": true
//! }
//! ```

use crate::storage::codec::RawRuleRow;
use crate::storage::traits::RuleStore;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Key the rule rows are stored under.
pub const RULES_KEY: &str = "anki_cousins";

/// Maximum size of the configuration file (4MB).
const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// Rule store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRuleStore {
    path: PathBuf,
}

impl JsonFileRuleStore {
    /// Creates a store for the given file. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole configuration object, or an empty one if the file is
    /// missing.
    fn read_object(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let metadata = fs::metadata(&self.path).map_err(|e| Error::OperationFailed {
            operation: "read_rules_metadata".to_string(),
            cause: e.to_string(),
        })?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(Error::InvalidInput(format!(
                "rules file exceeds maximum size of {MAX_FILE_SIZE} bytes: {}",
                self.path.display()
            )));
        }

        let content = fs::read_to_string(&self.path).map_err(|e| Error::OperationFailed {
            operation: "read_rules_file".to_string(),
            cause: e.to_string(),
        })?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::InvalidInput(format!(
                "rules file is not a JSON object: {}",
                self.path.display()
            ))),
            Err(e) => Err(Error::OperationFailed {
                operation: "parse_rules_file".to_string(),
                cause: e.to_string(),
            }),
        }
    }
}

impl RuleStore for JsonFileRuleStore {
    fn load_rows(&self) -> Result<Vec<Value>> {
        let mut object = self.read_object()?;
        match object.remove(RULES_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(rows)) => Ok(rows),
            Some(_) => Err(Error::InvalidInput(format!(
                "'{RULES_KEY}' is not a list in {}",
                self.path.display()
            ))),
        }
    }

    fn save_rows(&mut self, rows: &[RawRuleRow]) -> Result<()> {
        let mut object = self.read_object()?;
        let count = rows.len();
        let rows = serde_json::to_value(rows).map_err(|e| Error::OperationFailed {
            operation: "serialize_rules".to_string(),
            cause: e.to_string(),
        })?;
        object.insert(RULES_KEY.to_string(), rows);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_rules_dir".to_string(),
                cause: e.to_string(),
            })?;
        }

        let json = serde_json::to_string_pretty(&Value::Object(object)).map_err(|e| {
            Error::OperationFailed {
                operation: "serialize_rules_file".to_string(),
                cause: e.to_string(),
            }
        })?;
        fs::write(&self.path, json).map_err(|e| Error::OperationFailed {
            operation: "write_rules_file".to_string(),
            cause: e.to_string(),
        })?;

        tracing::debug!(path = %self.path.display(), rows = count, "Saved rule rows");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn row(field: &str) -> RawRuleRow {
        RawRuleRow(1, field.into(), 1, field.into(), "prefix".into(), 0.5)
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileRuleStore::new(dir.path().join("absent.json"));
        assert!(store.load_rows().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileRuleStore::new(dir.path().join("nested").join("rules.json"));
        store.save_rows(&[row("Back"), row("Front")]).unwrap();

        let rows = store.load_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], json!([1, "Back", 1, "Back", "prefix", 0.5]));
    }

    #[test]
    fn test_save_preserves_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"theme": "dark", "anki_cousins": []}"#).unwrap();

        let mut store = JsonFileRuleStore::new(&path);
        store.save_rows(&[row("Back")]).unwrap();

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved[RULES_KEY].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_loads_rows_saved_by_addon() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"anki_cousins": [[1, "Back", 1, "Back", "prefix", 0.5]], "theme": "dark"}"#,
        )
        .unwrap();

        let rows = JsonFileRuleStore::new(&path).load_rows().unwrap();
        assert_eq!(rows, vec![json!([1, "Back", 1, "Back", "prefix", 0.5])]);
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();
        assert!(JsonFileRuleStore::new(&path).load_rows().unwrap().is_empty());
    }

    #[test]
    fn test_non_object_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let mut store = JsonFileRuleStore::new(&path);
        assert!(matches!(store.load_rows(), Err(Error::InvalidInput(_))));
        assert!(store.save_rows(&[row("Back")]).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileRuleStore::new(&path).load_rows(),
            Err(Error::OperationFailed { .. })
        ));
    }
}
