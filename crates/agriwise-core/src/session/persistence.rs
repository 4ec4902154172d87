//! Persistence port for the session store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::model::PersistedSession;
use crate::error::{AgriwiseError, Result};

/// Durable storage for the persisted session subset.
///
/// The store calls `load` once at start-up and `save` after every effective
/// mutation. Implementations may defer the actual write; the store never
/// waits on it and never rolls back memory when it fails.
pub trait SessionPersistence: Send + Sync {
    /// Reads the stored record.
    ///
    /// - `Ok(Some(_))`: a record was found and decoded
    /// - `Ok(None)`: nothing stored yet
    /// - `Err(_)`: the record exists but is unreadable or corrupt
    fn load(&self) -> Result<Option<PersistedSession>>;

    /// Replaces the stored record.
    fn save(&self, record: &PersistedSession) -> Result<()>;
}

/// In-memory persistence.
///
/// Keeps the last saved record and counts writes. Useful for tests and for
/// sessions that must not touch the disk.
#[derive(Debug, Default)]
pub struct InMemorySessionPersistence {
    record: Mutex<Option<PersistedSession>>,
    saves: AtomicUsize,
}

impl InMemorySessionPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a persistence pre-seeded with `record`, as if a previous
    /// process had written it.
    pub fn with_record(record: PersistedSession) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Returns the last saved record.
    pub fn record(&self) -> Option<PersistedSession> {
        self.record.lock().ok().and_then(|guard| guard.clone())
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SessionPersistence for InMemorySessionPersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        let guard = self
            .record
            .lock()
            .map_err(|e| AgriwiseError::internal(format!("session record lock poisoned: {e}")))?;
        Ok(guard.clone())
    }

    fn save(&self, record: &PersistedSession) -> Result<()> {
        let mut guard = self
            .record
            .lock()
            .map_err(|e| AgriwiseError::internal(format!("session record lock poisoned: {e}")))?;
        *guard = Some(record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Theme;

    #[test]
    fn test_empty_load_is_none() {
        let persistence = InMemorySessionPersistence::new();
        assert!(persistence.load().unwrap().is_none());
        assert_eq!(persistence.save_count(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let persistence = InMemorySessionPersistence::new();
        let record = PersistedSession {
            theme: Theme::Dark,
            ..PersistedSession::default()
        };

        persistence.save(&record).unwrap();

        assert_eq!(persistence.load().unwrap(), Some(record.clone()));
        assert_eq!(persistence.record(), Some(record));
        assert_eq!(persistence.save_count(), 1);
    }
}
