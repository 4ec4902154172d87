//! User preference domain models.
//!
//! Preferences are independent of authentication: they survive logout and
//! are persisted alongside the session.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{AgriwiseError, Result};

/// Languages the client is localised into.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    Swahili,
    English,
    Kikuyu,
    Luo,
}

impl Language {
    /// Parses a language code, rejecting anything outside the enumeration.
    pub fn parse(code: &str) -> Result<Self> {
        code.trim().parse().map_err(|_| {
            AgriwiseError::invalid_argument(format!(
                "unsupported language '{}' (expected one of: {})",
                code,
                Self::codes().join(", ")
            ))
        })
    }

    /// All accepted language codes, in declaration order.
    pub fn codes() -> Vec<&'static str> {
        Self::iter().map(|lang| lang.into()).collect()
    }
}

/// Colour scheme of the client.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parses a theme name, rejecting anything but `light` and `dark`.
    pub fn parse(name: &str) -> Result<Self> {
        name.trim().parse().map_err(|_| {
            AgriwiseError::invalid_argument(format!(
                "unsupported theme '{name}' (expected light or dark)"
            ))
        })
    }
}

/// User preferences carried by every session snapshot.
///
/// `offline_mode` is runtime-only: it is never written to storage and is
/// reset to `false` on every rehydration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub language: Language,
    pub theme: Theme,
    pub notifications: bool,
    pub offline_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::Swahili,
            theme: Theme::Light,
            notifications: true,
            offline_mode: false,
        }
    }
}
