//! Configuration file support for liftlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftlog/config.toml`.

use crate::tracking::TimeWindow;
use crate::{Error, Result, WeightUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub profile: ProfileConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_store_file")]
    pub store_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store_file: default_store_file(),
        }
    }
}

impl DataConfig {
    /// Store file inside `data_dir`
    pub fn store_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.store_file)
    }
}

/// Defaults applied to a newly created profile
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    #[serde(default)]
    pub weight_unit: WeightUnit,
}

/// Progress tracking configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default)]
    pub default_window: TimeWindow,

    /// Check completed sets for new records as they are logged
    #[serde(default = "default_auto_records")]
    pub auto_records: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            default_window: TimeWindow::default(),
            auto_records: default_auto_records(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("liftlog")
}

fn default_store_file() -> String {
    "store.json".into()
}

fn default_auto_records() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        if config.data.store_file.trim().is_empty() {
            return Err(Error::Config("data.store_file must not be empty".into()));
        }
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("liftlog").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.store_file, "store.json");
        assert_eq!(config.profile.weight_unit, WeightUnit::Kg);
        assert_eq!(config.tracking.default_window, TimeWindow::ThreeMonths);
        assert!(config.tracking.auto_records);
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        let mut config = Config::default();
        config.tracking.default_window = TimeWindow::Year;

        config.save_to(&path).unwrap();
        let parsed = Config::load_from(&path).unwrap();

        assert_eq!(parsed.tracking.default_window, TimeWindow::Year);
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[profile]
weight_unit = "lbs"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.profile.weight_unit, WeightUnit::Lbs);
        assert_eq!(config.tracking.default_window, TimeWindow::ThreeMonths); // default
    }

    #[test]
    fn test_empty_store_file_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[data]\nstore_file = \"\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
