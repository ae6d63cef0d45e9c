//! Configuration management.
//!
//! Configuration is resolved in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config`, else the platform config directory)
//! 3. `COUSINS_*` environment variables
//!
//! ```toml
//! rules_path = "/home/me/.local/share/cousins/rules.json"
//!
//! [matching]
//! min_length = 4
//! min_contained_length = 4
//! similarity_candidates = 10
//!
//! [logging]
//! format = "json"
//! filter = "cousins=debug"
//! file = "/tmp/cousins.log"
//! ```

use crate::matching::MatchSettings;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application directory name under the platform config and data dirs.
const APP_DIR: &str = "cousins";

/// Main configuration for cousins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CousinsConfig {
    /// Path to the JSON rule file.
    pub rules_path: PathBuf,
    /// Comparator tunables.
    pub matching: MatchSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Logging section, kept as raw values until observability is initialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// `EnvFilter` directive, for example `cousins=debug`.
    pub filter: Option<String>,
    /// Log file path; logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Rule file path.
    pub rules_path: Option<String>,
    /// Matching section. Missing keys keep their defaults.
    pub matching: Option<MatchSettings>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

impl Default for CousinsConfig {
    fn default() -> Self {
        Self {
            rules_path: default_data_dir().join("rules.json"),
            matching: MatchSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Returns the platform data directory for cousins.
///
/// Falls back to `.cousins` in the working directory when no home directory
/// can be determined.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".cousins"),
        |dirs| dirs.data_dir().join(APP_DIR),
    )
}

impl CousinsConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the full configuration.
    ///
    /// An explicit path must exist and parse. Without one, the default
    /// locations are tried and silently skipped. Environment overrides are
    /// applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/cousins/` on macOS)
    /// 2. XDG config dir (`~/.config/cousins/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join(APP_DIR).join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join(APP_DIR)
                .join("config.toml"),
        ];
        for path in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Ignoring config file"),
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `CousinsConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(rules_path) = file.rules_path {
            config.rules_path = PathBuf::from(rules_path);
        }
        if let Some(matching) = file.matching {
            config.matching = matching;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Applies `COUSINS_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Numeric values that do not parse are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());

        if let Some(path) = lookup("COUSINS_RULES_PATH").filter(|v| !v.is_empty()) {
            self.rules_path = PathBuf::from(path);
        }
        if let Some(v) = number("COUSINS_MIN_LENGTH") {
            self.matching.min_length = v;
        }
        if let Some(v) = number("COUSINS_MIN_CONTAINED_LENGTH") {
            self.matching.min_contained_length = v;
        }
        if let Some(v) = number("COUSINS_SIMILARITY_CANDIDATES") {
            self.matching.similarity_candidates = v;
        }
        if let Some(format) = lookup("COUSINS_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(filter) = lookup("COUSINS_LOG") {
            self.logging.filter = Some(filter);
        }
        if let Some(file) = lookup("COUSINS_LOG_FILE").filter(|v| !v.is_empty()) {
            self.logging.file = Some(PathBuf::from(file));
        }
    }

    /// Sets the rule file path.
    #[must_use]
    pub fn with_rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_path = path.into();
        self
    }

    /// Sets the match settings.
    #[must_use]
    pub fn with_matching(mut self, matching: MatchSettings) -> Self {
        self.matching = matching;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CousinsConfig::default();
        assert!(config.rules_path.ends_with("rules.json"));
        assert_eq!(config.matching, MatchSettings::default());
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_load_from_file_partial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "rules_path = \"/tmp/rules.json\"\n\n[matching]\nsimilarity_candidates = 3\n\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = CousinsConfig::load_from_file(&path).unwrap();
        assert_eq!(config.rules_path, PathBuf::from("/tmp/rules.json"));
        assert_eq!(config.matching.similarity_candidates, 3);
        assert_eq!(config.matching.min_length, 4);
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            CousinsConfig::load(Some(&missing)),
            Err(Error::OperationFailed { .. })
        ));
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "rules_path = [").unwrap();
        assert!(CousinsConfig::load_from_file(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("COUSINS_RULES_PATH", "/data/rules.json"),
            ("COUSINS_MIN_LENGTH", "6"),
            ("COUSINS_MIN_CONTAINED_LENGTH", "not a number"),
            ("COUSINS_SIMILARITY_CANDIDATES", " 25 "),
            ("COUSINS_LOG", "cousins=trace"),
            ("COUSINS_LOG_FILE", ""),
        ]);
        let mut config = CousinsConfig::default();
        config.apply_overrides(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.rules_path, PathBuf::from("/data/rules.json"));
        assert_eq!(config.matching.min_length, 6);
        assert_eq!(config.matching.min_contained_length, 4);
        assert_eq!(config.matching.similarity_candidates, 25);
        assert_eq!(config.logging.filter.as_deref(), Some("cousins=trace"));
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_builders() {
        let config = CousinsConfig::new()
            .with_rules_path("rules.json")
            .with_matching(MatchSettings::default().with_min_length(2));
        assert_eq!(config.rules_path, PathBuf::from("rules.json"));
        assert_eq!(config.matching.min_length, 2);
    }
}
