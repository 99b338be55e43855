//! Storage backend abstraction.
//!
//! This module defines the [`KeyValueBackend`] trait, the raw text key-value
//! surface that [`PersistentStore`](crate::storage::PersistentStore) builds its
//! typed records on. Backends deal in text only; JSON encoding and the
//! fallback policy live one layer up.
//!
//! # Implementations
//!
//! - [`JsonFileBackend`](crate::storage::JsonFileBackend): single JSON file with atomic writes
//! - [`MemoryBackend`](crate::storage::MemoryBackend): process-local map, for tests and
//!   throwaway sessions

use crate::domain::error::Result;

/// Durable per-profile key-value storage holding text values.
///
/// Implementations report failures honestly; it is the caller's job to decide
/// whether a failure is fatal. The persistent store never lets them escape.
///
/// # Examples
///
/// ```
/// use country_explorer::storage::{KeyValueBackend, MemoryBackend};
///
/// let mut backend = MemoryBackend::new();
/// backend.write("favorites", "[\"USA\"]")?;
/// assert_eq!(backend.read("favorites")?.as_deref(), Some("[\"USA\"]"));
/// backend.delete("favorites")?;
/// assert_eq!(backend.read("favorites")?, None);
/// # Ok::<(), country_explorer::ExplorerError>(())
/// ```
pub trait KeyValueBackend: Send {
    /// Returns the stored text for `key`, or `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is refused (quota, permissions, I/O).
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn delete(&mut self, key: &str) -> Result<()>;
}
