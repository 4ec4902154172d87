//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned on-disk shapes. Domain models in
//! `agriwise-core` never carry a version; conversion goes through
//! version-migrate.

mod config_root;
mod session;

pub use config_root::{
    CONFIG_ROOT_ENTITY, ConfigRoot, ConfigRootV1_0_0, create_config_root_migrator,
};
pub use session::{
    SESSION_RECORD_ENTITY, SessionRecordDTO, SessionRecordV1_0_0, UserDTOV1_0_0,
    create_session_record_migrator,
};
