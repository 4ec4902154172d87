//! ConfigRoot DTOs and migrations
//!
//! Versioned DTO for `config.toml`. Every section is optional in the file;
//! missing sections and keys fall back to the domain defaults.

use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, Versioned};

use agriwise_core::config::{LoggingSettings, PersistenceSettings, RootConfig, StorageSettings};
use agriwise_core::error::{AgriwiseError, Result};

/// Entity name of the root configuration in the migrator.
pub const CONFIG_ROOT_ENTITY: &str = "config_root";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSectionV1_0_0 {
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSectionV1_0_0 {
    #[serde(default = "default_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSectionV1_0_0 {
    #[serde(default = "default_write_behind")]
    pub write_behind: bool,
}

fn default_namespace() -> String {
    StorageSettings::default().namespace
}

fn default_level() -> String {
    LoggingSettings::default().level
}

fn default_write_behind() -> bool {
    PersistenceSettings::default().write_behind
}

impl Default for StorageSectionV1_0_0 {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl Default for LoggingSectionV1_0_0 {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Default for PersistenceSectionV1_0_0 {
    fn default() -> Self {
        Self {
            write_behind: default_write_behind(),
        }
    }
}

/// Root configuration structure V1.0.0 for `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ConfigRootV1_0_0 {
    #[serde(default)]
    pub storage: StorageSectionV1_0_0,

    #[serde(default)]
    pub logging: LoggingSectionV1_0_0,

    #[serde(default)]
    pub persistence: PersistenceSectionV1_0_0,
}

/// Type alias for the latest ConfigRoot version.
pub type ConfigRoot = ConfigRootV1_0_0;

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<RootConfig> for ConfigRootV1_0_0 {
    fn into_domain(self) -> RootConfig {
        RootConfig {
            storage: StorageSettings {
                namespace: self.storage.namespace,
            },
            logging: LoggingSettings {
                level: self.logging.level,
            },
            persistence: PersistenceSettings {
                write_behind: self.persistence.write_behind,
            },
        }
    }
}

impl version_migrate::FromDomain<RootConfig> for ConfigRootV1_0_0 {
    fn from_domain(config: RootConfig) -> Self {
        ConfigRootV1_0_0 {
            storage: StorageSectionV1_0_0 {
                namespace: config.storage.namespace,
            },
            logging: LoggingSectionV1_0_0 {
                level: config.logging.level,
            },
            persistence: PersistenceSectionV1_0_0 {
                write_behind: config.persistence.write_behind,
            },
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for ConfigRoot entities.
pub fn create_config_root_migrator() -> Result<version_migrate::Migrator> {
    let mut migrator = version_migrate::Migrator::builder().build();

    let config_path = version_migrate::Migrator::define(CONFIG_ROOT_ENTITY)
        .from::<ConfigRootV1_0_0>()
        .into_with_save::<RootConfig>();

    migrator.register(config_path).map_err(|e| {
        AgriwiseError::migration(format!("Failed to register config_root path: {}", e))
    })?;

    Ok(migrator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let migrator = create_config_root_migrator().unwrap();
        let toml_value: toml::Value = toml::from_str(
            r#"
version = "1.0.0"

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config: RootConfig = migrator
            .load_flat_from(CONFIG_ROOT_ENTITY, toml_value)
            .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.storage.namespace, "agriwise-auth-storage");
        assert!(config.persistence.write_behind);
    }

    #[test]
    fn test_save_config_root_flat() {
        let migrator = create_config_root_migrator().unwrap();
        let json_str = migrator
            .save_domain_flat(CONFIG_ROOT_ENTITY, &RootConfig::default())
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&json_str).unwrap();

        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["storage"]["namespace"], "agriwise-auth-storage");
        assert_eq!(json["persistence"]["write_behind"], true);
    }
}
