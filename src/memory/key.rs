//! Conversation keys
//!
//! A conversation thread is identified by companion name, model name and user.
//! `CompanionKey` is what callers hand in (possibly incomplete, e.g. straight
//! from a request body); `HistoryKey` is the validated form whose string is the
//! storage key of the short-term log.
//!
//! The three fields are joined with `-`. The mapping is only injective while
//! `-` does not occur inside the field values; existing stores already hold
//! keys in this format, so the delimiter is kept as is.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delimiter between key components
pub const KEY_DELIMITER: char = '-';

/// Caller-supplied identity of a conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionKey {
    /// Companion (agent) name
    pub companion_name: String,
    /// Model name
    pub model_name: String,
    /// User ID; absent when the caller could not authenticate the user
    #[serde(default)]
    pub user_id: Option<String>,
}

impl CompanionKey {
    /// Create a key for a known user
    pub fn new(
        companion_name: impl Into<String>,
        model_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        CompanionKey {
            companion_name: companion_name.into(),
            model_name: model_name.into(),
            user_id: Some(user_id.into()),
        }
    }

    /// Derive the storage key, or `None` if any component is missing or empty
    pub fn derive(&self) -> Option<HistoryKey> {
        let user_id = self.user_id.as_deref()?;
        HistoryKey::new(&self.companion_name, &self.model_name, user_id).ok()
    }
}

/// Validated storage key of one conversation's short-term log
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryKey(String);

impl HistoryKey {
    /// Build a key from its three components; all must be non-empty
    pub fn new(companion_name: &str, model_name: &str, user_id: &str) -> Result<Self> {
        for (field, value) in [
            ("companionName", companion_name),
            ("modelName", model_name),
            ("userId", user_id),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidInput(format!("{} must not be empty", field)));
            }
        }

        Ok(HistoryKey(format!(
            "{companion_name}{KEY_DELIMITER}{model_name}{KEY_DELIMITER}{user_id}"
        )))
    }

    /// The derived string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HistoryKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&CompanionKey> for HistoryKey {
    type Error = Error;

    fn try_from(key: &CompanionKey) -> Result<Self> {
        let user_id = key
            .user_id
            .as_deref()
            .ok_or_else(|| Error::InvalidInput("userId is required".to_string()))?;
        HistoryKey::new(&key.companion_name, &key.model_name, user_id)
    }
}
