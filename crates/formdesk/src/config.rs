//! Configuration management for formdesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "formdesk";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "forms.db";

/// Worksheet names: 1 to 31 characters, none of `[]:*?/\`, not quoted.
static SHEET_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^'\[\]:*?/\\]([^\[\]:*?/\\]{0,29}[^'\[\]:*?/\\])?$")
        .expect("static sheet name pattern is valid")
});

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FORMDESK_`)
/// 2. TOML config file at `~/.config/formdesk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/formdesk/forms.db`
    pub database_path: Option<PathBuf>,
}

/// Spreadsheet export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported files are written to.
    /// Defaults to the current directory.
    pub output_dir: Option<PathBuf>,
    /// Name of the single worksheet.
    pub sheet_name: String,
    /// strftime format for the timestamp column, in local time.
    pub timestamp_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            sheet_name: "Datos".to_string(),
            timestamp_format: "%d/%m/%Y, %H:%M:%S".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FORMDESK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !SHEET_NAME.is_match(&self.export.sheet_name) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "invalid sheet_name '{}': use 1 to 31 characters without []:*?/\\",
                    self.export.sheet_name
                ),
            });
        }

        let format = &self.export.timestamp_format;
        if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::ConfigValidation {
                message: format!("invalid timestamp_format: '{format}'"),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.export.output_dir.is_none());
        assert_eq!(config.export.sheet_name, "Datos");
        assert_eq!(config.export.timestamp_format, "%d/%m/%Y, %H:%M:%S");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_sheet_names() {
        let mut config = Config::default();
        for good in ["Datos", "A", "Responses 2024", "x".repeat(31).as_str()] {
            config.export.sheet_name = good.to_string();
            assert!(config.validate().is_ok(), "rejected {good}");
        }
        for bad in ["", "a/b", "[x]", "'quoted'", "x".repeat(32).as_str()] {
            config.export.sheet_name = bad.to_string();
            let err = config.validate().unwrap_err().to_string();
            assert!(err.contains("sheet_name"), "accepted {bad}");
        }
    }

    #[test]
    fn test_validate_timestamp_format() {
        let mut config = Config::default();
        config.export.timestamp_format = "%Y-%m-%d %H:%M".to_string();
        assert!(config.validate().is_ok());

        config.export.timestamp_format = "%Q".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timestamp_format"));

        config.export.timestamp_format = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config.database_path().to_string_lossy().contains("forms.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("formdesk"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        assert!(Config::default_data_dir()
            .to_string_lossy()
            .contains("formdesk"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[export]\nsheet_name = \"Respuestas\"\noutput_dir = \"/tmp/exports\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.export.sheet_name, "Respuestas");
        assert_eq!(
            config.export.output_dir,
            Some(PathBuf::from("/tmp/exports"))
        );
        assert_eq!(
            config.export.timestamp_format,
            ExportConfig::default().timestamp_format
        );
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[export]\nsheet_name = \"a:b\"\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_reads_top_level_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ndatabase_path = \"/data/forms.db\"\n\n[export]\nsheet_name = \"Hoja1\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/data/forms.db"));
        assert_eq!(config.export.sheet_name, "Hoja1");
    }

    #[test]
    fn test_export_config_deserialize_partial() {
        let json = r#"{"sheet_name": "Hoja1"}"#;
        let export: ExportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(export.sheet_name, "Hoja1");
        assert!(export.output_dir.is_none());
    }
}
