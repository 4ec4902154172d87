//! Session record DTOs and migrations
//!
//! The persisted session subset is written as a flat, versioned JSON object:
//! the DTO's camelCase fields plus a `version` field.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, Versioned};

use agriwise_core::error::{AgriwiseError, Result};
use agriwise_core::preferences::{Language, Theme};
use agriwise_core::session::PersistedSession;
use agriwise_core::user::User;

/// Entity name of the session record in the migrator.
pub const SESSION_RECORD_ENTITY: &str = "session_record";

/// User as stored inside a V1.0.0 session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDTOV1_0_0 {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub farm_size: f64,
    #[serde(default)]
    pub crops: BTreeSet<String>,
    #[serde(default)]
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Session record V1.0.0 (initial versioned schema).
///
/// Same fields the client has always persisted under
/// `agriwise-auth-storage`, now with an explicit schema version.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionRecordV1_0_0 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDTOV1_0_0>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Written for external readers; recomputed from `token` on load.
    #[serde(default)]
    pub is_authenticated: bool,

    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub theme: Theme,

    #[serde(default = "default_notifications")]
    pub notifications: bool,
}

fn default_notifications() -> bool {
    true
}

/// Type alias for the latest session record version.
pub type SessionRecordDTO = SessionRecordV1_0_0;

impl Default for SessionRecordV1_0_0 {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            is_authenticated: false,
            language: Language::default(),
            theme: Theme::default(),
            notifications: default_notifications(),
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl From<UserDTOV1_0_0> for User {
    fn from(dto: UserDTOV1_0_0) -> Self {
        User {
            id: dto.id,
            name: dto.name,
            email: dto.email,
            phone: dto.phone,
            location: dto.location,
            farm_size: dto.farm_size,
            crops: dto.crops,
            language: dto.language,
            avatar: dto.avatar,
        }
    }
}

impl From<User> for UserDTOV1_0_0 {
    fn from(user: User) -> Self {
        UserDTOV1_0_0 {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            location: user.location,
            farm_size: user.farm_size,
            crops: user.crops,
            language: user.language,
            avatar: user.avatar,
        }
    }
}

/// Convert SessionRecordV1_0_0 DTO to domain model.
impl IntoDomain<PersistedSession> for SessionRecordV1_0_0 {
    fn into_domain(self) -> PersistedSession {
        PersistedSession {
            is_authenticated: self.token.is_some(),
            user: self.user.map(Into::into),
            token: self.token,
            language: self.language,
            theme: self.theme,
            notifications: self.notifications,
        }
    }
}

/// Convert domain model to SessionRecordV1_0_0 DTO for persistence.
impl version_migrate::FromDomain<PersistedSession> for SessionRecordV1_0_0 {
    fn from_domain(record: PersistedSession) -> Self {
        SessionRecordV1_0_0 {
            is_authenticated: record.token.is_some(),
            user: record.user.map(Into::into),
            token: record.token,
            language: record.language,
            theme: record.theme,
            notifications: record.notifications,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for session records.
///
/// # Migration Path
///
/// - V1.0.0 → PersistedSession: Converts DTO to domain model
///
/// A future schema adds a DTO and a `.step::<...>()` here.
///
/// # Example
///
/// ```ignore
/// let migrator = create_session_record_migrator()?;
/// let record: PersistedSession = migrator.load_flat_from("session_record", json_value)?;
/// ```
pub fn create_session_record_migrator() -> Result<version_migrate::Migrator> {
    let mut migrator = version_migrate::Migrator::builder().build();

    // Register migration path: V1.0.0 -> PersistedSession
    let record_path = version_migrate::Migrator::define(SESSION_RECORD_ENTITY)
        .from::<SessionRecordV1_0_0>()
        .into_with_save::<PersistedSession>();

    migrator.register(record_path).map_err(|e| {
        AgriwiseError::migration(format!("Failed to register session_record path: {}", e))
    })?;

    Ok(migrator)
}
