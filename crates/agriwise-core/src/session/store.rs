//! The session store: single writer, snapshot readers, write-behind
//! persistence.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use super::action::{SessionAction, reduce};
use super::model::{PersistedSession, Session};
use super::persistence::SessionPersistence;
use super::selectors::Selection;
use crate::error::Result;
use crate::preferences::{Language, Theme};
use crate::user::{User, UserPatch};

/// Owner of the process-wide [`Session`].
///
/// Construct one explicitly and pass it by reference (or `Arc`) to whatever
/// needs it; there is no global instance. Mutations go through the action
/// methods and are serialized: a transition, its publication and its save
/// all finish before the next transition starts, so the durable record is
/// written in commit order. Readers get `Arc<Session>` snapshots that never
/// change and are not blocked by saves.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use agriwise_core::session::{InMemorySessionPersistence, SessionStore};
/// use agriwise_core::user::User;
///
/// let store = SessionStore::open(Arc::new(InMemorySessionPersistence::new()));
/// store.login(User::new("1", "Amina"), "tok-123").unwrap();
/// assert!(store.snapshot().is_authenticated());
/// ```
pub struct SessionStore {
    state: watch::Sender<Arc<Session>>,
    persistence: Arc<dyn SessionPersistence>,
    /// Held across reduce, publish and save.
    writer: Mutex<()>,
}

impl SessionStore {
    /// Creates a store holding the start-up defaults (`is_loading = true`).
    ///
    /// Call [`rehydrate`](Self::rehydrate) before relying on auth state.
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        let (state, _) = watch::channel(Arc::new(Session::default()));
        Self {
            state,
            persistence,
            writer: Mutex::new(()),
        }
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates a store and rehydrates it immediately.
    pub fn open(persistence: Arc<dyn SessionPersistence>) -> Self {
        let store = Self::new(persistence);
        store.rehydrate();
        store
    }

    /// Seeds the session from durable storage.
    ///
    /// A missing or unreadable record falls back to the defaults; nothing is
    /// surfaced to the caller. The resulting snapshot always has
    /// `is_loading = false` and `offline_mode = false`.
    pub fn rehydrate(&self) -> Arc<Session> {
        let _writer = self.lock_writer();
        let record = match self.persistence.load() {
            Ok(Some(record)) => {
                if !record.is_consistent() {
                    tracing::warn!(
                        "[SessionStore] Stored credentials are inconsistent, signing out"
                    );
                }
                tracing::info!(
                    authenticated = record.is_consistent() && record.token.is_some(),
                    "[SessionStore] Restored persisted session"
                );
                Some(record)
            }
            Ok(None) => {
                tracing::info!("[SessionStore] No persisted session, using defaults");
                None
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "[SessionStore] Persisted session unreadable, using defaults"
                );
                None
            }
        };

        let session = Arc::new(Session::rehydrated(record));
        self.state.send_replace(session.clone());
        session
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<Session> {
        self.state.borrow().clone()
    }

    /// Returns a projection of the current snapshot.
    pub fn select<T>(&self, selector: impl FnOnce(&Session) -> T) -> T {
        selector(&self.state.borrow())
    }

    /// Subscribes to every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Session>> {
        self.state.subscribe()
    }

    /// Subscribes to a projection; the returned [`Selection`] only wakes
    /// when the projected value changes.
    pub fn watch_selection<T, F>(&self, selector: F) -> Selection<T, F>
    where
        T: Clone + PartialEq,
        F: Fn(&Session) -> T,
    {
        Selection::new(self.subscribe(), selector)
    }

    /// Applies `action` and returns the resulting snapshot.
    ///
    /// An action that leaves the session equal to the current snapshot
    /// publishes nothing and writes nothing. On error the session is left
    /// as it was.
    pub fn dispatch(&self, action: SessionAction) -> Result<Arc<Session>> {
        let name = action.name();
        let _writer = self.lock_writer();
        let mut outcome: Result<Option<PersistedSession>> = Ok(None);

        self.state.send_if_modified(|current| match reduce(current, action) {
            Ok(next) if next == **current => false,
            Ok(next) => {
                outcome = Ok(Some(next.persisted()));
                *current = Arc::new(next);
                true
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });

        match outcome {
            Ok(Some(record)) => {
                tracing::debug!(action = name, "[SessionStore] Session updated");
                self.persist(&record);
            }
            Ok(None) => tracing::debug!(action = name, "[SessionStore] No change"),
            Err(e) => {
                tracing::debug!(action = name, error = %e, "[SessionStore] Action rejected");
                return Err(e);
            }
        }

        Ok(self.snapshot())
    }

    fn persist(&self, record: &PersistedSession) {
        if let Err(e) = self.persistence.save(record) {
            tracing::warn!(error = %e, "[SessionStore] Failed to persist session");
        }
    }

    // ============================================================================
    // Actions
    // ============================================================================

    pub fn login(&self, user: User, token: impl Into<String>) -> Result<Arc<Session>> {
        self.dispatch(SessionAction::Login {
            user,
            token: token.into(),
        })
    }

    pub fn logout(&self) -> Result<Arc<Session>> {
        self.dispatch(SessionAction::Logout)
    }

    /// Merges `patch` into the logged-in user. No-op when nobody is logged in.
    pub fn update_user(&self, patch: UserPatch) -> Result<Arc<Session>> {
        self.dispatch(SessionAction::UpdateUser(patch))
    }

    pub fn set_loading(&self, loading: bool) -> Result<Arc<Session>> {
        self.dispatch(SessionAction::SetLoading(loading))
    }

    pub fn set_language(&self, language: Language) -> Result<Arc<Session>> {
        self.dispatch(SessionAction::SetLanguage(language))
    }

    /// Parses `code` and sets the language; unknown codes are rejected.
    pub fn set_language_code(&self, code: &str) -> Result<Arc<Session>> {
        self.set_language(Language::parse(code)?)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<Arc<Session>> {
        self.dispatch(SessionAction::SetTheme(theme))
    }

    pub fn set_theme_name(&self, name: &str) -> Result<Arc<Session>> {
        self.set_theme(Theme::parse(name)?)
    }

    pub fn set_notifications(&self, enabled: bool) -> Result<Arc<Session>> {
        self.dispatch(SessionAction::SetNotifications(enabled))
    }

    pub fn set_offline_mode(&self, offline: bool) -> Result<Arc<Session>> {
        self.dispatch(SessionAction::SetOfflineMode(offline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgriwiseError;
    use crate::session::InMemorySessionPersistence;

    struct FailingPersistence;

    impl SessionPersistence for FailingPersistence {
        fn load(&self) -> Result<Option<PersistedSession>> {
            Err(AgriwiseError::serialization("JSON", "unexpected end of input"))
        }

        fn save(&self, _record: &PersistedSession) -> Result<()> {
            Err(AgriwiseError::io("disk full"))
        }
    }

    /// Stalls on one specific record so a later transition can race it.
    struct SlowPersistence {
        last: Mutex<Option<PersistedSession>>,
    }

    impl SessionPersistence for SlowPersistence {
        fn load(&self) -> Result<Option<PersistedSession>> {
            Ok(self.last.lock().unwrap().clone())
        }

        fn save(&self, record: &PersistedSession) -> Result<()> {
            if record.language == Language::English && record.theme == Theme::Light {
                std::thread::sleep(std::time::Duration::from_millis(300));
            }
            *self.last.lock().unwrap() = Some(record.clone());
            Ok(())
        }
    }

    #[test]
    fn test_concurrent_dispatch_saves_in_commit_order() {
        let persistence = Arc::new(SlowPersistence {
            last: Mutex::new(None),
        });
        let store = SessionStore::open(persistence.clone());

        std::thread::scope(|scope| {
            scope.spawn(|| store.set_language(Language::English).unwrap());
            std::thread::sleep(std::time::Duration::from_millis(50));
            store.set_theme(Theme::Dark).unwrap();
        });

        let durable = persistence.last.lock().unwrap().clone().unwrap();
        assert_eq!(durable, store.snapshot().persisted());

        let reopened = SessionStore::open(persistence);
        assert_eq!(reopened.snapshot().theme(), store.snapshot().theme());
        assert_eq!(reopened.snapshot().language(), Language::English);
    }

    #[test]
    fn test_new_store_is_loading() {
        let store = SessionStore::new(Arc::new(InMemorySessionPersistence::new()));
        assert!(store.snapshot().is_loading);
    }

    #[test]
    fn test_open_clears_loading() {
        let store = SessionStore::open(Arc::new(InMemorySessionPersistence::new()));
        assert!(!store.snapshot().is_loading);
    }

    #[test]
    fn test_corrupt_record_falls_back_to_defaults() {
        let store = SessionStore::open(Arc::new(FailingPersistence));
        let session = store.snapshot();
        assert!(!session.is_loading);
        assert!(!session.is_authenticated());
        assert_eq!(session.language(), Language::Swahili);
    }

    #[test]
    fn test_failed_save_keeps_memory_state() {
        let store = SessionStore::open(Arc::new(FailingPersistence));
        let session = store.set_theme(Theme::Dark).unwrap();
        assert_eq!(session.theme(), Theme::Dark);
        assert_eq!(store.snapshot().theme(), Theme::Dark);
    }

    #[test]
    fn test_every_effective_mutation_is_saved() {
        let persistence = Arc::new(InMemorySessionPersistence::new());
        let store = SessionStore::open(persistence.clone());

        store.set_language(Language::English).unwrap();
        store.login(User::new("1", "Amina"), "tok").unwrap();
        store.set_offline_mode(true).unwrap();

        assert_eq!(persistence.save_count(), 3);
        let record = persistence.record().unwrap();
        assert_eq!(record.language, Language::English);
        assert!(record.is_authenticated);
    }

    #[test]
    fn test_no_op_action_is_not_saved_or_published() {
        let persistence = Arc::new(InMemorySessionPersistence::new());
        let store = SessionStore::open(persistence.clone());
        let mut rx = store.subscribe();

        store.set_theme(Theme::Light).unwrap();
        store.update_user(UserPatch::new().with_name("X")).unwrap();

        assert_eq!(persistence.save_count(), 0);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_rejected_action_leaves_snapshot() {
        let store = SessionStore::open(Arc::new(InMemorySessionPersistence::new()));
        let before = store.snapshot();

        let err = store.set_language_code("klingon").unwrap_err();
        assert!(err.is_invalid_argument());
        let err = store.login(User::new("1", "Amina"), "").unwrap_err();
        assert!(err.is_invalid_argument());

        assert_eq!(*store.snapshot(), *before);
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let store = SessionStore::open(Arc::new(InMemorySessionPersistence::new()));
        let before = store.snapshot();
        store.set_theme_name("dark").unwrap();

        assert_eq!(before.theme(), Theme::Light);
        assert_eq!(store.snapshot().theme(), Theme::Dark);
    }

    #[test]
    fn test_subscriber_sees_new_snapshot() {
        let store = SessionStore::open(Arc::new(InMemorySessionPersistence::new()));
        let mut rx = store.subscribe();

        store.set_notifications(false).unwrap();

        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().notifications());
    }

    #[test]
    fn test_select_projection() {
        let store = SessionStore::open(Arc::new(InMemorySessionPersistence::new()));
        store.login(User::new("7", "Otieno"), "tok").unwrap();
        let name = store.select(|s| s.user().map(|u| u.name.clone()));
        assert_eq!(name.as_deref(), Some("Otieno"));
    }
}
