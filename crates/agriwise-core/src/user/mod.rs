//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: the `User` record (identity and farm profile)
//! - `patch`: partial updates merged into an existing `User`

mod model;
mod patch;

// Re-export public API
pub use model::User;
pub use patch::UserPatch;
