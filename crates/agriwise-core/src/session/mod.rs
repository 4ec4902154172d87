//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the `Session` snapshot and its persisted subset
//! - `action`: `SessionAction` and the pure `reduce` transition
//! - `persistence`: the `SessionPersistence` port plus an in-memory adapter
//! - `store`: `SessionStore`, the single writer
//! - `selectors`: named projections and change subscriptions
//! - `route`: root navigation gate

mod action;
mod model;
mod persistence;
pub mod route;
pub mod selectors;
mod store;

// Re-export public API
pub use action::{SessionAction, reduce};
pub use model::{PersistedSession, Session};
pub use persistence::{InMemorySessionPersistence, SessionPersistence};
pub use route::{RootRoute, root_route};
pub use selectors::Selection;
pub use store::SessionStore;

/// Storage namespace the client has always used for the session record.
pub const DEFAULT_NAMESPACE: &str = "agriwise-auth-storage";
