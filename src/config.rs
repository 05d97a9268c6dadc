//! Configuration for sensorgrid.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default marker text found in the third cell of a record's first row.
pub const DEFAULT_MARKER_TEXT: &str = "ModuleCode";

/// Default title of the light follower row.
pub const DEFAULT_LIGHT_TITLE: &str = "ISL29035_Light";

/// Default title of the temperature follower row.
pub const DEFAULT_TEMPERATURE_TITLE: &str = "SHT3X_Temperature";

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Literals that identify record blocks in the grid
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Truncate temperature sequences to this length before export
    #[serde(default)]
    pub truncation_length: Option<NonZeroUsize>,

    /// Directory for exported datasets
    pub export_path: PathBuf,

    /// Directory for cumulative extraction statistics
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sensorgrid");

        Self {
            layout: LayoutConfig::default(),
            truncation_length: None,
            export_path: data_dir.join("exports"),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.layout.validate()?;
        Ok(config)
    }

    /// Save configuration to an explicit file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sensorgrid")
            .join("config.json")
    }

    /// Path of the persisted extraction statistics.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("extraction_stats.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)?;
        std::fs::create_dir_all(&self.data_path)?;
        Ok(())
    }
}

/// The literals that make up the record-block layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Text in column 2 that marks a record's first row
    pub marker_column_text: String,
    /// Title in column 0 of the light row (marker + 1)
    pub light_title: String,
    /// Title in column 0 of the temperature row (marker + 2)
    pub temperature_title: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            marker_column_text: DEFAULT_MARKER_TEXT.to_string(),
            light_title: DEFAULT_LIGHT_TITLE.to_string(),
            temperature_title: DEFAULT_TEMPERATURE_TITLE.to_string(),
        }
    }
}

impl LayoutConfig {
    /// Reject layouts that could never match, or that make the two follower
    /// rows indistinguishable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker_column_text.is_empty() {
            return Err(ConfigError::Invalid("marker_column_text is empty".into()));
        }
        if self.light_title.is_empty() || self.temperature_title.is_empty() {
            return Err(ConfigError::Invalid("follower row titles must not be empty".into()));
        }
        if self.light_title == self.temperature_title {
            return Err(ConfigError::Invalid(format!(
                "light and temperature titles are both {:?}",
                self.light_title
            )));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.layout.marker_column_text, "ModuleCode");
        assert_eq!(config.layout.light_title, "ISL29035_Light");
        assert_eq!(config.layout.temperature_title, "SHT3X_Temperature");
        assert!(config.truncation_length.is_none());
    }

    #[test]
    fn test_layout_validation() {
        assert!(LayoutConfig::default().validate().is_ok());

        let layout = LayoutConfig {
            temperature_title: DEFAULT_LIGHT_TITLE.to_string(),
            ..LayoutConfig::default()
        };
        assert!(matches!(layout.validate(), Err(ConfigError::Invalid(_))));

        let layout = LayoutConfig {
            marker_column_text: String::new(),
            ..LayoutConfig::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            truncation_length: NonZeroUsize::new(50),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_layout_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"export_path": "/tmp/out", "data_path": "/tmp/data", "layout": {"light_title": "LUX"}}"#,
        )
        .unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.layout.light_title, "LUX");
        assert_eq!(loaded.layout.marker_column_text, DEFAULT_MARKER_TEXT);
        assert!(loaded.truncation_length.is_none());
    }

    #[test]
    fn test_zero_truncation_length_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"export_path": "/tmp/out", "data_path": "/tmp/data", "truncation_length": 0}"#,
        )
        .unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
