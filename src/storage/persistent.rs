//! Typed, best-effort record store.
//!
//! [`PersistentStore`] owns the durable text representation of the three user
//! records (session, favorites, settings) and is the only component that
//! touches a [`KeyValueBackend`]. Its contract is best-effort durability:
//!
//! - reads never fail: missing keys, read errors, and corrupt text all yield
//!   the documented fallback;
//! - writes never fail: serialization and backend errors are logged and
//!   swallowed.
//!
//! The store is a cheap `Clone` handle that controllers receive at
//! construction, rather than an ambient global.

use crate::storage::backend::KeyValueBackend;
use crate::storage::models::{SessionRecord, SettingsRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Key holding the session record.
pub const SESSION_KEY: &str = "user";
/// Key holding the favorite code list.
pub const FAVORITES_KEY: &str = "favorites";
/// Key holding the settings record.
pub const SETTINGS_KEY: &str = "app_settings";

/// Shared handle to the user's persistent records.
///
/// # Examples
///
/// ```
/// use country_explorer::storage::{MemoryBackend, PersistentStore};
///
/// let store = PersistentStore::new(MemoryBackend::new());
/// store.save_favorites(&["USA".to_string()]);
/// assert_eq!(store.load_favorites(), vec!["USA".to_string()]);
///
/// store.clear_all_user_data();
/// assert!(store.load_favorites().is_empty());
/// ```
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<Mutex<Box<dyn KeyValueBackend>>>,
}

impl PersistentStore {
    /// Wraps a backend.
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Arc::new(Mutex::new(Box::new(backend))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn KeyValueBackend>> {
        // Backend calls are single writes, so a poisoned lock still guards consistent data.
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_text(&self, key: &str) -> Option<String> {
        match self.lock().read(key) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "storage read failed, using fallback");
                None
            }
        }
    }

    /// Returns the parsed JSON under `key`, or `None` if absent or unparsable.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<Value> {
        let text = self.read_text(key)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "stored value is not valid JSON");
                None
            }
        }
    }

    /// Decodes the value under `key`, returning `fallback` on any problem.
    ///
    /// An absent key, a backend read error, syntactically invalid text, and a
    /// value of the wrong shape all produce `fallback`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let Some(value) = self.get_value(key) else {
            return fallback;
        };
        match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "stored value has unexpected shape");
                fallback
            }
        }
    }

    /// Encodes and stores `value` under `key`. Failures are logged, not returned.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to encode value for storage");
                return;
            }
        };
        if let Err(e) = self.lock().write(key, &text) {
            tracing::warn!(key = %key, error = %e, "storage write failed");
        }
    }

    /// Removes `key`. Failures are logged, not returned.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.lock().delete(key) {
            tracing::warn!(key = %key, error = %e, "storage removal failed");
        }
    }

    pub fn save_session(&self, session: &SessionRecord) {
        self.set(SESSION_KEY, session);
    }

    /// The stored session, if one exists and decodes.
    #[must_use]
    pub fn load_session(&self) -> Option<SessionRecord> {
        self.get_or(SESSION_KEY, None)
    }

    pub fn clear_session(&self) {
        self.remove(SESSION_KEY);
    }

    /// Stored favorite codes in order, defaulting to empty.
    ///
    /// Anything other than a JSON array yields an empty list; non-string
    /// entries inside an array are skipped rather than discarding the rest.
    #[must_use]
    pub fn load_favorites(&self) -> Vec<String> {
        match self.get_value(FAVORITES_KEY) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(code) => Some(code),
                    other => {
                        tracing::debug!(entry = %other, "skipping non-string favorite entry");
                        None
                    }
                })
                .collect(),
            Some(other) => {
                tracing::warn!(kind = %json_kind(&other), "favorites value is not an array");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    pub fn save_favorites(&self, codes: &[String]) {
        self.set(FAVORITES_KEY, codes);
    }

    /// Stored settings, with defaults for anything missing or unreadable.
    #[must_use]
    pub fn load_settings(&self) -> SettingsRecord {
        self.get_or(SETTINGS_KEY, SettingsRecord::default())
    }

    pub fn save_settings(&self, settings: &SettingsRecord) {
        self.set(SETTINGS_KEY, settings);
    }

    /// Removes session, favorites, and settings.
    ///
    /// Each key is removed independently; a failure on one does not stop the
    /// others.
    pub fn clear_all_user_data(&self) {
        let _span = tracing::debug_span!("clear_all_user_data").entered();
        for key in [SESSION_KEY, FAVORITES_KEY, SETTINGS_KEY] {
            self.remove(key);
        }
    }
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore").finish_non_exhaustive()
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
