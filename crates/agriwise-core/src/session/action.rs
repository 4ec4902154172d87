//! Session actions and the pure transition function.

use super::model::Session;
use crate::error::{AgriwiseError, Result};
use crate::preferences::{Language, Theme};
use crate::user::{User, UserPatch};

/// Every mutation the store accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Login { user: User, token: String },
    Logout,
    UpdateUser(UserPatch),
    SetLoading(bool),
    SetLanguage(Language),
    SetTheme(Theme),
    SetNotifications(bool),
    SetOfflineMode(bool),
}

impl SessionAction {
    /// Short name used in log lines. Never includes the token.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::UpdateUser(_) => "update_user",
            Self::SetLoading(_) => "set_loading",
            Self::SetLanguage(_) => "set_language",
            Self::SetTheme(_) => "set_theme",
            Self::SetNotifications(_) => "set_notifications",
            Self::SetOfflineMode(_) => "set_offline_mode",
        }
    }
}

/// Applies `action` to `state` and returns the next snapshot.
///
/// `state` is never modified. An `UpdateUser` with no logged-in user
/// returns an unchanged copy.
pub fn reduce(state: &Session, action: SessionAction) -> Result<Session> {
    let mut next = state.clone();

    match action {
        SessionAction::Login { user, token } => {
            if user.id.trim().is_empty() {
                return Err(AgriwiseError::invalid_argument("user id must not be empty"));
            }
            if token.trim().is_empty() {
                return Err(AgriwiseError::invalid_argument("token must not be empty"));
            }
            user.validate()?;
            next.user = Some(user);
            next.token = Some(token);
            next.is_loading = false;
        }
        SessionAction::Logout => {
            next.user = None;
            next.token = None;
            next.is_loading = false;
        }
        SessionAction::UpdateUser(patch) => {
            if let Some(user) = &state.user {
                next.user = Some(patch.apply_to(user)?);
            }
        }
        SessionAction::SetLoading(loading) => next.is_loading = loading,
        SessionAction::SetLanguage(language) => next.preferences.language = language,
        SessionAction::SetTheme(theme) => next.preferences.theme = theme,
        SessionAction::SetNotifications(enabled) => next.preferences.notifications = enabled,
        SessionAction::SetOfflineMode(offline) => next.preferences.offline_mode = offline,
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in() -> Session {
        reduce(
            &Session::default(),
            SessionAction::Login {
                user: User::new("1", "Amina"),
                token: "tok-123".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_login_sets_credentials_and_clears_loading() {
        let session = logged_in();
        assert!(session.is_authenticated());
        assert!(!session.is_loading);
        assert_eq!(session.token(), Some("tok-123"));
    }

    #[test]
    fn test_login_rejects_blank_token() {
        let err = reduce(
            &Session::default(),
            SessionAction::Login {
                user: User::new("1", "Amina"),
                token: "   ".to_string(),
            },
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_login_rejects_blank_user_id() {
        let err = reduce(
            &Session::default(),
            SessionAction::Login {
                user: User::new("", "Amina"),
                token: "tok".to_string(),
            },
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_login_rejects_non_finite_farm_size() {
        for size in [f64::INFINITY, f64::NAN] {
            let err = reduce(
                &Session::default(),
                SessionAction::Login {
                    user: User::new("1", "Amina").with_farm_size(size),
                    token: "tok".to_string(),
                },
            )
            .unwrap_err();
            assert!(err.is_invalid_argument());
        }
    }

    #[test]
    fn test_update_user_rejects_non_finite_farm_size() {
        let state = logged_in();
        let err = reduce(
            &state,
            SessionAction::UpdateUser(UserPatch::new().with_farm_size(f64::NAN)),
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(state.user().unwrap().farm_size, 0.0);
    }

    #[test]
    fn test_logout_keeps_preferences() {
        let mut session = logged_in();
        session.preferences.language = Language::Luo;
        session.preferences.offline_mode = true;

        let next = reduce(&session, SessionAction::Logout).unwrap();
        assert!(!next.is_authenticated());
        assert!(next.user.is_none());
        assert_eq!(next.preferences, session.preferences);
    }

    #[test]
    fn test_update_user_without_user_is_unchanged() {
        let state = Session::default();
        let next = reduce(
            &state,
            SessionAction::UpdateUser(UserPatch::new().with_name("X")),
        )
        .unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn test_update_user_rejects_id_change_and_leaves_input() {
        let state = logged_in();
        let err = reduce(
            &state,
            SessionAction::UpdateUser(UserPatch::new().with_id("other")),
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(state.user.as_ref().unwrap().id, "1");
    }

    #[test]
    fn test_preference_setters() {
        let state = Session::default();
        let state = reduce(&state, SessionAction::SetTheme(Theme::Dark)).unwrap();
        let state = reduce(&state, SessionAction::SetNotifications(false)).unwrap();
        let state = reduce(&state, SessionAction::SetOfflineMode(true)).unwrap();
        let state = reduce(&state, SessionAction::SetLoading(false)).unwrap();

        assert_eq!(state.theme(), Theme::Dark);
        assert!(!state.notifications());
        assert!(state.offline_mode());
        assert!(!state.is_loading);
        // auth untouched
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_action_name_hides_token() {
        let action = SessionAction::Login {
            user: User::new("1", "Amina"),
            token: "secret".to_string(),
        };
        assert_eq!(action.name(), "login");
    }
}
