//! JSON file implementation of the session persistence port.
//!
//! Stores the persisted session subset as `<config_dir>/<namespace>.json`,
//! a flat versioned record written through [`AtomicFile`].

use std::path::{Path, PathBuf};

use agriwise_core::error::{AgriwiseError, Result};
use agriwise_core::session::{PersistedSession, SessionPersistence};

use crate::dto::{SESSION_RECORD_ENTITY, create_session_record_migrator};
use crate::paths::AgriwisePaths;
use crate::storage::AtomicFile;

/// File-backed [`SessionPersistence`].
///
/// # Example file
///
/// ```json
/// {
///   "version": "1.0.0",
///   "user": { "id": "1", "name": "Amina", ... },
///   "token": "tok-123",
///   "isAuthenticated": true,
///   "language": "english",
///   "theme": "dark",
///   "notifications": true
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonSessionStorage {
    file: AtomicFile,
}

impl JsonSessionStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path),
        }
    }

    /// Resolves the record file for `namespace` under the config directory.
    pub fn from_paths(paths: &AgriwisePaths, namespace: &str) -> Result<Self> {
        let path = paths
            .session_file(namespace)
            .map_err(|e| AgriwiseError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Deletes the record. The next load reports no record.
    pub fn clear(&self) -> Result<()> {
        self.file.remove()?;
        Ok(())
    }
}

impl SessionPersistence for JsonSessionStorage {
    fn load(&self) -> Result<Option<PersistedSession>> {
        let Some(content) = self.file.read()? else {
            return Ok(None);
        };

        let json_value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            AgriwiseError::serialization(
                "JSON",
                format!(
                    "Failed to parse session record '{}': {}",
                    self.path().display(),
                    e
                ),
            )
        })?;

        let migrator = create_session_record_migrator()?;
        let record: PersistedSession = migrator
            .load_flat_from(SESSION_RECORD_ENTITY, json_value)
            .map_err(|e| {
                AgriwiseError::migration(format!(
                    "Failed to migrate session record '{}': {}",
                    self.path().display(),
                    e
                ))
            })?;

        Ok(Some(record))
    }

    fn save(&self, record: &PersistedSession) -> Result<()> {
        let migrator = create_session_record_migrator()?;
        let json_str = migrator
            .save_domain_flat(SESSION_RECORD_ENTITY, record)
            .map_err(|e| {
                AgriwiseError::serialization(
                    "JSON",
                    format!("Failed to serialize session record: {}", e),
                )
            })?;

        // Re-encode pretty so the file stays readable by hand.
        let json_value: serde_json::Value = serde_json::from_str(&json_str)?;
        let pretty = serde_json::to_string_pretty(&json_value)?;

        self.file.write(&pretty)?;
        tracing::debug!(
            path = %self.path().display(),
            "[JsonSessionStorage] Session record written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agriwise_core::preferences::{Language, Theme};
    use agriwise_core::session::SessionStore;
    use agriwise_core::user::{User, UserPatch};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn storage(temp_dir: &TempDir) -> JsonSessionStorage {
        JsonSessionStorage::from_paths(
            &AgriwisePaths::new(Some(temp_dir.path())),
            "agriwise-auth-storage",
        )
        .unwrap()
    }

    fn logged_in_record() -> PersistedSession {
        PersistedSession {
            user: Some(User::new("1", "Amina").with_farm_size(2.5)),
            token: Some("tok-123".to_string()),
            is_authenticated: true,
            language: Language::Kikuyu,
            theme: Theme::Dark,
            notifications: false,
        }
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(storage(&temp_dir).load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage.save(&logged_in_record()).unwrap();

        assert_eq!(storage.load().unwrap(), Some(logged_in_record()));
        assert!(storage.path().ends_with("agriwise-auth-storage.json"));
    }

    #[test]
    fn test_saved_file_is_versioned_camel_case() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage.save(&logged_in_record()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(storage.path()).unwrap()).unwrap();
        assert_eq!(raw["version"], "1.0.0");
        assert_eq!(raw["isAuthenticated"], true);
        assert_eq!(raw["language"], "kikuyu");
        assert_eq!(raw["user"]["farmSize"], 2.5);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        fs::write(storage.path(), "{ not json").unwrap();

        let err = storage.load().unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_unversioned_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        fs::write(
            storage.path(),
            r#"{"user":null,"token":null,"language":"english","theme":"dark"}"#,
        )
        .unwrap();

        let err = storage.load().unwrap_err();
        assert!(err.is_migration());
    }

    #[test]
    fn test_clear_removes_record() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        storage.save(&logged_in_record()).unwrap();

        storage.clear().unwrap();

        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_store_survives_restart_through_file() {
        let temp_dir = TempDir::new().unwrap();

        let store = SessionStore::open(Arc::new(storage(&temp_dir)));
        store.set_language(Language::English).unwrap();
        store.login(User::new("1", "Amina"), "tok-123").unwrap();
        store.set_offline_mode(true).unwrap();
        drop(store);

        let restarted = SessionStore::open(Arc::new(storage(&temp_dir)));
        let session = restarted.snapshot();
        assert!(session.is_authenticated());
        assert_eq!(session.language(), Language::English);
        assert!(!session.offline_mode());
        assert!(!session.is_loading);
    }

    #[test]
    fn test_non_finite_farm_size_never_reaches_the_file() {
        let temp_dir = TempDir::new().unwrap();

        let store = SessionStore::open(Arc::new(storage(&temp_dir)));
        store.set_theme(Theme::Dark).unwrap();
        store
            .login(User::new("1", "Amina").with_farm_size(2.5), "tok-123")
            .unwrap();
        for size in [f64::INFINITY, f64::NAN] {
            let err = store
                .update_user(UserPatch::new().with_farm_size(size))
                .unwrap_err();
            assert!(err.is_invalid_argument());
            let err = store
                .login(User::new("1", "Amina").with_farm_size(size), "tok-456")
                .unwrap_err();
            assert!(err.is_invalid_argument());
        }
        drop(store);

        let record = storage(&temp_dir).load().unwrap().unwrap();
        assert_eq!(record.user.unwrap().farm_size, 2.5);

        let restarted = SessionStore::open(Arc::new(storage(&temp_dir)));
        let session = restarted.snapshot();
        assert!(session.is_authenticated());
        assert_eq!(session.theme(), Theme::Dark);
    }

    #[test]
    fn test_store_falls_back_on_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        fs::write(storage.path(), "garbage").unwrap();

        let store = SessionStore::open(Arc::new(storage));
        let session = store.snapshot();
        assert!(!session.is_authenticated());
        assert_eq!(session.language(), Language::Swahili);
        assert!(!session.is_loading);
    }
}
