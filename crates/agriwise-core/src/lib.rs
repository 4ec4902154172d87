//! Domain layer of the AgriWise session store.
//!
//! Holds the user and preference models, the session snapshot with its
//! pure transition function, the `SessionStore`, and the persistence port
//! the infrastructure crate implements.

pub mod config;
pub mod error;
pub mod preferences;
pub mod session;
pub mod user;

// Re-export common error type
pub use error::{AgriwiseError, Result};
