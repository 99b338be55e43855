//! Storage record models for the persistence layer.
//!
//! These are the JSON shapes written under the session and settings keys. They
//! are forgiving on read: missing fields fall back to defaults so
//! that records written by older builds, or edited by hand, still load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local identity of the person using the explorer.
///
/// Created on login, destroyed on logout, and read once at start to decide
/// which UI branch to show. This is a display-name stub, not a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Name shown in the header. Older records stored it as `username`.
    #[serde(alias = "username")]
    pub display_name: String,

    /// When the session was created, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Creates a session record stamped with the current time.
    ///
    /// # Examples
    ///
    /// ```
    /// use country_explorer::storage::SessionRecord;
    ///
    /// let session = SessionRecord::new("Ada");
    /// assert_eq!(session.display_name, "Ada");
    /// assert!(session.logged_in_at.is_some());
    /// ```
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            logged_in_at: Some(Utc::now()),
        }
    }
}

/// Color scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Application settings.
///
/// Not wired to any control inside the core, but must survive a save/load
/// round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRecord {
    pub theme: Theme,
    /// BCP 47 style language tag, `"en"` by default.
    pub language: String,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: "en".to_string(),
        }
    }
}
