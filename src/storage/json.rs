//! JSON file-based storage backend.
//!
//! All keys live in one human-readable JSON document. Every mutation rewrites
//! the document through a temporary file followed by a rename, so a crash
//! mid-write leaves either the old or the new document on disk, never a torn
//! one.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "user": "{\"displayName\":\"Ada\"}",
//!     "favorites": "[\"USA\",\"NZL\"]",
//!     "app_settings": "{\"theme\":\"dark\",\"language\":\"en\"}"
//!   }
//! }
//! ```
//!
//! Values are stored as opaque text, exactly like a browser's local storage,
//! so one corrupt value never prevents the others from loading. The file is
//! the only copy of the data, so several handles may share it.

use crate::domain::error::{ExplorerError, Result};
use crate::storage::backend::KeyValueBackend;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

/// On-disk container.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    /// Version of the storage format for future migrations.
    version: u32,

    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// JSON file storage backend.
///
/// Nothing is cached: every read loads the document from disk and every
/// mutation is a read-modify-rename cycle. Other handles on the same file,
/// in this process or another, see each other's changes and never overwrite
/// keys they did not touch.
///
/// # Thread Safety
///
/// `Send` but not `Sync`; the persistent store serializes access behind a mutex.
#[derive(Debug)]
pub struct JsonFileBackend {
    file_path: PathBuf,
}

impl JsonFileBackend {
    /// Opens the storage file, creating parent directories as needed.
    ///
    /// A missing file reads as empty. So does a file that exists but cannot be
    /// parsed; that case is logged and the file is replaced on the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the file
    /// exists but cannot be read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use country_explorer::storage::JsonFileBackend;
    /// use std::path::PathBuf;
    ///
    /// let backend = JsonFileBackend::open(PathBuf::from("/tmp/explorer/storage.json"))?;
    /// # Ok::<(), country_explorer::ExplorerError>(())
    /// ```
    pub fn open(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "opening JSON storage");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let backend = Self { file_path };
        let data = backend.load()?;
        tracing::debug!(entry_count = data.entries.len(), "storage opened");

        Ok(backend)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Current on-disk document. A missing file is an empty document.
    fn load(&self) -> Result<StorageData> {
        let contents = match std::fs::read_to_string(&self.file_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StorageData::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<StorageData>(&contents) {
            Ok(data) => {
                tracing::trace!(version = data.version, entries = data.entries.len(), "loaded storage data");
                Ok(data)
            }
            Err(e) => {
                tracing::warn!(path = ?self.file_path, error = %e, "storage file is corrupt, treating as empty");
                Ok(StorageData::default())
            }
        }
    }

    /// Writes `data` to disk via temp file and rename.
    fn save(&self, data: &StorageData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| ExplorerError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::debug!(path = ?self.file_path, "storage saved");
        Ok(())
    }

    /// Loads the latest document, applies `change`, and saves it back if
    /// `change` reports a modification.
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let mut data = self.load()?;
        if !change(&mut data.entries) {
            tracing::trace!("document unchanged, skipping save");
            return Ok(());
        }
        data.version = FORMAT_VERSION;
        self.save(&data)
    }
}

impl KeyValueBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.entries.remove(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_write", key = %key, len = value.len()).entered();

        self.update(|entries| {
            if entries.get(key).is_some_and(|current| current == value) {
                return false;
            }
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_delete", key = %key).entered();

        self.update(|entries| entries.remove(key).is_some())
    }
}
