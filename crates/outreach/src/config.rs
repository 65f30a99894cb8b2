//! Configuration management for outreach.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Component, Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "outreach";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "outreach.db";

/// Default photo directory name inside the data directory.
const PHOTO_DIR_NAME: &str = "uploaded_images";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `OUTREACH_`, sections split on
///    `__`, e.g. `OUTREACH_STORAGE__PHOTO_DIR`)
/// 2. TOML config file at `~/.config/outreach/config.toml`
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
    /// Defaults to `~/.local/share/outreach/outreach.db`
    pub database_path: Option<PathBuf>,
    /// Directory holding uploaded photos.
    /// Defaults to `~/.local/share/outreach/uploaded_images`
    pub photo_dir: Option<PathBuf>,
}

/// Export-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Name of the CSV entry inside ZIP bundles.
    pub csv_name: String,
    /// Directory prefix for photos inside ZIP bundles.
    pub images_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_name: "outreach_data.csv".to_string(),
            images_prefix: "images".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources, reading the TOML layer from
    /// `config_path` or the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("OUTREACH_").split("__"));

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
        let csv_name = &self.export.csv_name;
        if !is_bundle_path(csv_name) || !csv_name.ends_with(".csv") {
            return Err(Error::ConfigValidation {
                message: format!(
                    "csv_name must be a relative file name ending in .csv, got '{csv_name}'"
                ),
            });
        }

        let prefix = &self.export.images_prefix;
        if !is_bundle_path(prefix) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "images_prefix must be a relative path without '..', got '{prefix}'"
                ),
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

    /// Get the photo directory, resolving defaults if not set.
    #[must_use]
    pub fn photo_dir(&self) -> PathBuf {
        self.storage
            .photo_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(PHOTO_DIR_NAME))
    }
}

/// Whether `value` can name an entry inside a ZIP bundle: non-empty, no
/// surrounding whitespace, and made only of plain path components.
fn is_bundle_path(value: &str) -> bool {
    !value.is_empty()
        && value.trim() == value
        && Path::new(value)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
