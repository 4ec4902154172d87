//! Configuration domain models.
//!
//! Version-agnostic; the versioned on-disk shape lives in the
//! infrastructure DTOs.

use serde::{Deserialize, Serialize};

use crate::error::{AgriwiseError, Result};
use crate::session::DEFAULT_NAMESPACE;

/// Where and under which key the session record is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// File stem of the session record inside the config directory.
    pub namespace: String,
}

impl StorageSettings {
    /// Rejects namespaces that are not a single plain file stem.
    pub fn validate(&self) -> Result<()> {
        validate_namespace(&self.namespace)
    }
}

/// A namespace must be non-blank, contain no path separator and not be
/// `.` or `..`.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    let invalid = namespace.trim().is_empty()
        || namespace.contains(['/', '\\'])
        || namespace == "."
        || namespace == "..";
    if invalid {
        return Err(AgriwiseError::config(format!(
            "invalid storage namespace '{namespace}' (expected a plain file name)"
        )));
    }
    Ok(())
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `info` or `agriwise_core=debug`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Queue writes on a background task instead of writing inline.
    pub write_behind: bool,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self { write_behind: true }
    }
}

/// Root configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RootConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub persistence: PersistenceSettings,
}

impl RootConfig {
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()
    }
}
