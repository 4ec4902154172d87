//! Session snapshot and its persisted subset.

use serde::{Deserialize, Serialize};

use crate::preferences::{Language, Preferences, Theme};
use crate::user::User;

/// Process-wide authentication and preference state.
///
/// A `Session` is an immutable snapshot: the store replaces it wholesale on
/// every transition and readers hold it behind an `Arc`.
///
/// Authentication is derived from the token, so `is_authenticated()` can
/// never disagree with `token.is_some()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    /// True until the first rehydration has completed.
    pub is_loading: bool,
    #[serde(flatten)]
    pub preferences: Preferences,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            is_loading: true,
            preferences: Preferences::default(),
        }
    }
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn language(&self) -> Language {
        self.preferences.language
    }

    pub fn theme(&self) -> Theme {
        self.preferences.theme
    }

    pub fn notifications(&self) -> bool {
        self.preferences.notifications
    }

    pub fn offline_mode(&self) -> bool {
        self.preferences.offline_mode
    }

    /// Extracts the subset that survives a process restart.
    pub fn persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.user.clone(),
            token: self.token.clone(),
            is_authenticated: self.is_authenticated(),
            language: self.preferences.language,
            theme: self.preferences.theme,
            notifications: self.preferences.notifications,
        }
    }

    /// Builds the post-rehydration snapshot.
    ///
    /// `None` yields the defaults. Either way the result is no longer
    /// loading and offline mode is back to its default.
    pub fn rehydrated(record: Option<PersistedSession>) -> Self {
        let Some(record) = record else {
            return Self {
                is_loading: false,
                ..Self::default()
            };
        };

        let (user, token) = record.credentials();
        Self {
            user,
            token,
            is_loading: false,
            preferences: Preferences {
                language: record.language,
                theme: record.theme,
                notifications: record.notifications,
                offline_mode: false,
            },
        }
    }
}

/// The persisted subset of a [`Session`].
///
/// `is_loading` and `offline_mode` are runtime-only and never stored.
/// `is_authenticated` is written for readers of the raw record but ignored
/// on load: the token alone decides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub language: Language,
    pub theme: Theme,
    pub notifications: bool,
}

impl Default for PersistedSession {
    fn default() -> Self {
        Session::default().persisted()
    }
}

impl PersistedSession {
    /// Returns true when user and token are either both present (with a
    /// non-blank token) or both absent.
    pub fn is_consistent(&self) -> bool {
        match (&self.user, &self.token) {
            (Some(_), Some(token)) => !token.trim().is_empty(),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns the credentials, or neither of them if the record is
    /// inconsistent.
    fn credentials(&self) -> (Option<User>, Option<String>) {
        if self.is_consistent() {
            (self.user.clone(), self.token.clone())
        } else {
            (None, None)
        }
    }
}
