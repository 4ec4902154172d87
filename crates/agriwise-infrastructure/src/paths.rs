//! Unified path management for agriwise files.
//!
//! Paths resolve via AppPaths from the version-migrate crate, unless a base
//! directory is given explicitly (tests, `--home`, `AGRIWISE_HOME`).

use std::path::{Path, PathBuf};
use agriwise_core::config::validate_namespace;
use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
    /// Namespace is not a plain file stem.
    InvalidNamespace(String),
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
            PathError::InvalidNamespace(ns) => write!(f, "Invalid storage namespace '{}'", ns),
        }
    }
}

impl std::error::Error for PathError {}

/// Path resolver for agriwise.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/agriwise/                  # Config directory (AppPaths default)
/// ├── config.toml                      # Application configuration
/// └── agriwise-auth-storage.json       # Persisted session record
/// ```
#[derive(Debug, Clone, Default)]
pub struct AgriwisePaths {
    base: Option<PathBuf>,
}

impl AgriwisePaths {
    /// Creates a resolver. With `Some(base)`, every path lives under `base`.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    fn app_paths() -> AppPaths {
        AppPaths::new("agriwise")
    }

    /// Returns the agriwise configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => Self::app_paths()
                .config_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path of the session record for `namespace`.
    ///
    /// The namespace must stay inside the config directory.
    pub fn session_file(&self, namespace: &str) -> Result<PathBuf, PathError> {
        if validate_namespace(namespace).is_err() {
            return Err(PathError::InvalidNamespace(namespace.to_string()));
        }
        Ok(self.config_dir()?.join(format!("{namespace}.json")))
    }
}
