//! Root navigation gate.
//!
//! Presentation code must not render either navigation stack before the
//! auth state is known; this decides which one to show.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::model::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RootRoute {
    /// Rehydration has not finished.
    Loading,
    /// Known to be signed out.
    SignIn,
    /// Authenticated: main tabs.
    Main,
}

pub fn root_route(session: &Session) -> RootRoute {
    if session.is_loading {
        RootRoute::Loading
    } else if session.is_authenticated() {
        RootRoute::Main
    } else {
        RootRoute::SignIn
    }
}
