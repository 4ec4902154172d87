//! Read-only projections of the session.
//!
//! The plain functions are the named selectors handed to presentation code;
//! [`Selection`] turns any projection into a change stream.

use std::sync::Arc;

use tokio::sync::watch;

use super::model::Session;
use crate::preferences::{Language, Theme};
use crate::user::User;

pub fn user(session: &Session) -> Option<User> {
    session.user.clone()
}

pub fn is_authenticated(session: &Session) -> bool {
    session.is_authenticated()
}

pub fn language(session: &Session) -> Language {
    session.language()
}

pub fn theme(session: &Session) -> Theme {
    session.theme()
}

pub fn offline_mode(session: &Session) -> bool {
    session.offline_mode()
}

/// A subscription to one projection of the session.
///
/// Snapshots whose projection equals the last observed value are skipped,
/// so a theme watcher does not wake on a login.
pub struct Selection<T, F> {
    rx: watch::Receiver<Arc<Session>>,
    selector: F,
    last: T,
}

impl<T, F> Selection<T, F>
where
    T: Clone + PartialEq,
    F: Fn(&Session) -> T,
{
    pub fn new(mut rx: watch::Receiver<Arc<Session>>, selector: F) -> Self {
        let last = selector(&rx.borrow_and_update());
        Self { rx, selector, last }
    }

    /// The most recently observed value.
    pub fn current(&self) -> &T {
        &self.last
    }

    /// Waits for the projection to change and returns the new value.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<T> {
        loop {
            if self.rx.changed().await.is_err() {
                return None;
            }
            let next = (self.selector)(&self.rx.borrow_and_update());
            if next != self.last {
                self.last = next.clone();
                return Some(next);
            }
        }
    }
}
