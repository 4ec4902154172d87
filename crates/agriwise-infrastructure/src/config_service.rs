//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` in the agriwise config
//! directory. The file is a flat versioned record read through the
//! config_root migrator.

use std::path::{Path, PathBuf};

use agriwise_core::config::RootConfig;
use agriwise_core::error::{AgriwiseError, Result};

use crate::dto::{CONFIG_ROOT_ENTITY, create_config_root_migrator};
use crate::paths::AgriwisePaths;
use crate::storage::AtomicFile;

/// Reads and writes `config.toml`.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicFile,
}

impl ConfigService {
    pub fn new(paths: &AgriwisePaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| AgriwiseError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Gets the root configuration.
    ///
    /// A missing file yields the defaults. An unreadable or invalid file is
    /// logged and also yields the defaults.
    pub fn get_config(&self) -> RootConfig {
        match self.load() {
            Ok(Some(config)) => config,
            Ok(None) => RootConfig::default(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path().display(),
                    error = %e,
                    "[ConfigService] Invalid config file, using defaults"
                );
                RootConfig::default()
            }
        }
    }

    /// Loads the configuration, reporting parse and migration failures.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load(&self) -> Result<Option<RootConfig>> {
        let Some(content) = self.file.read()? else {
            return Ok(None);
        };

        let toml_value: toml::Value = toml::from_str(&content)?;

        let migrator = create_config_root_migrator()?;
        let config: RootConfig = migrator
            .load_flat_from(CONFIG_ROOT_ENTITY, toml_value)
            .map_err(|e| {
                AgriwiseError::config(format!(
                    "Failed to migrate config '{}': {}",
                    self.path().display(),
                    e
                ))
            })?;
        config.validate()?;

        Ok(Some(config))
    }

    /// Writes `config` as a versioned TOML file.
    pub fn save(&self, config: &RootConfig) -> Result<()> {
        // The migrator emits JSON; convert to TOML for the file.
        let migrator = create_config_root_migrator()?;
        let json_str = migrator
            .save_domain_flat(CONFIG_ROOT_ENTITY, config)
            .map_err(|e| {
                AgriwiseError::serialization("TOML", format!("Failed to serialize config: {}", e))
            })?;
        let json_value: serde_json::Value = serde_json::from_str(&json_str)?;
        let toml_value = json_to_toml(&json_value)?;
        let toml_str = toml::to_string_pretty(&toml_value)?;

        self.file.write(&toml_str)?;
        Ok(())
    }

    /// Writes the default configuration unless a file already exists.
    ///
    /// Returns whether the file was written.
    pub fn write_default(&self, overwrite: bool) -> Result<bool> {
        if !overwrite && self.path().exists() {
            tracing::info!(
                path = %self.path().display(),
                "[ConfigService] Config file already exists, leaving it"
            );
            return Ok(false);
        }

        self.save(&RootConfig::default())?;
        tracing::info!(
            path = %self.path().display(),
            "[ConfigService] Wrote default config"
        );
        Ok(true)
    }
}

/// Converts a serde_json::Value to a toml::Value.
///
/// TOML has no null; config DTOs never emit one.
fn json_to_toml(json: &serde_json::Value) -> Result<toml::Value> {
    match json {
        serde_json::Value::Null => Err(AgriwiseError::serialization(
            "TOML",
            "null values cannot be represented",
        )),
        serde_json::Value::Bool(b) => Ok(toml::Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(toml::Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(toml::Value::Float(f))
            } else {
                Err(AgriwiseError::serialization(
                    "TOML",
                    format!("Unsupported JSON number: {}", n),
                ))
            }
        }
        serde_json::Value::String(s) => Ok(toml::Value::String(s.clone())),
        serde_json::Value::Array(arr) => {
            let toml_arr: Result<Vec<toml::Value>> = arr.iter().map(json_to_toml).collect();
            Ok(toml::Value::Array(toml_arr?))
        }
        serde_json::Value::Object(obj) => {
            let mut toml_map = toml::map::Map::new();
            for (k, v) in obj {
                toml_map.insert(k.clone(), json_to_toml(v)?);
            }
            Ok(toml::Value::Table(toml_map))
        }
    }
}
