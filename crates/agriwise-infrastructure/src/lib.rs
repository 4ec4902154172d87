//! File-backed adapters for the AgriWise session store.

pub mod config_service;
pub mod dto;
pub mod json_session_storage;
pub mod paths;
pub mod storage;
pub mod write_behind;

pub use crate::config_service::ConfigService;
pub use crate::json_session_storage::JsonSessionStorage;
pub use crate::paths::AgriwisePaths;
pub use crate::write_behind::WriteBehindPersistence;
