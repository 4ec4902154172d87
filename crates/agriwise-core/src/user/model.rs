//! User domain model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{AgriwiseError, Result};
use crate::preferences::Language;

/// An authenticated farmer: identity plus farm profile.
///
/// `id` is fixed once the record exists. Every other field may change
/// through [`UserPatch`](super::UserPatch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier, immutable for the lifetime of the record.
    pub id: String,
    /// Display name
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Free-text location (village, county, ...)
    pub location: String,
    /// Farm size; the client never states a unit.
    pub farm_size: f64,
    /// Crops grown on the farm. Unordered; kept sorted for stable output.
    #[serde(default)]
    pub crops: BTreeSet<String>,
    /// Language the user registered with.
    pub language: Language,
    /// Avatar reference (URI or asset key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Creates a user with the given identity and an empty farm profile.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            location: String::new(),
            farm_size: 0.0,
            crops: BTreeSet::new(),
            language: Language::default(),
            avatar: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_farm_size(mut self, farm_size: f64) -> Self {
        self.farm_size = farm_size;
        self
    }

    pub fn with_crops<I, S>(mut self, crops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.crops = crops.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Checks the fields the builders cannot constrain.
    pub fn validate(&self) -> Result<()> {
        check_farm_size(self.farm_size)
    }
}

/// Rejects `inf` and `NaN`: JSON has no encoding for them.
pub(crate) fn check_farm_size(farm_size: f64) -> Result<()> {
    if farm_size.is_finite() {
        Ok(())
    } else {
        Err(AgriwiseError::invalid_argument(format!(
            "farm size must be a finite number (got {farm_size})"
        )))
    }
}
