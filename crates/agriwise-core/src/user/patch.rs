//! Partial user updates.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::User;
use super::model::check_farm_size;
use crate::error::{AgriwiseError, Result};
use crate::preferences::Language;

/// A partial `User`: every field is optional and only present fields are
/// applied by [`UserPatch::apply_to`].
///
/// `id` is accepted so that payloads echoing the full record still merge,
/// but it must match the current user's id.
///
/// `avatar` has three states: absent (keep), `Some(None)` (clear, `null` in
/// JSON) and `Some(Some(uri))` (replace).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crops: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub avatar: Option<Option<String>>,
}

/// Maps a present field (including `null`) to `Some`, so a missing field
/// stays distinguishable from an explicit `null`.
fn present_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_farm_size(mut self, farm_size: f64) -> Self {
        self.farm_size = Some(farm_size);
        self
    }

    pub fn with_crops<I, S>(mut self, crops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.crops = Some(crops.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(Some(avatar.into()));
        self
    }

    /// Removes the user's avatar on merge.
    pub fn clear_avatar(mut self) -> Self {
        self.avatar = Some(None);
        self
    }

    /// Sets the id carried by the payload. Only useful for echoing the
    /// current id back; any other value is rejected on merge.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns true when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges this patch into `user`, returning a new record.
    ///
    /// The input is left untouched. Fails with `InvalidArgument` when the
    /// patch would change the user's id or carries a non-finite farm size.
    pub fn apply_to(&self, user: &User) -> Result<User> {
        if let Some(id) = &self.id {
            if *id != user.id {
                return Err(AgriwiseError::invalid_argument(format!(
                    "user id is immutable (current '{}', patch '{}')",
                    user.id, id
                )));
            }
        }

        if let Some(farm_size) = self.farm_size {
            check_farm_size(farm_size)?;
        }

        Ok(User {
            id: user.id.clone(),
            name: self.name.clone().unwrap_or_else(|| user.name.clone()),
            email: self.email.clone().unwrap_or_else(|| user.email.clone()),
            phone: self.phone.clone().unwrap_or_else(|| user.phone.clone()),
            location: self.location.clone().unwrap_or_else(|| user.location.clone()),
            farm_size: self.farm_size.unwrap_or(user.farm_size),
            crops: self.crops.clone().unwrap_or_else(|| user.crops.clone()),
            language: self.language.unwrap_or(user.language),
            avatar: match &self.avatar {
                Some(avatar) => avatar.clone(),
                None => user.avatar.clone(),
            },
        })
    }
}
