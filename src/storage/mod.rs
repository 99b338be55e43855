//! Storage layer for session, favorites, and settings records.
//!
//! This module provides the persistence abstraction for user state that lives
//! on the client device. Raw text storage is pluggable through
//! [`KeyValueBackend`]; typed records and the never-fail read/write policy are
//! layered on top by [`PersistentStore`].
//!
//! # Modules
//!
//! - `backend`: Raw key-value trait
//! - `json`: JSON file-backed implementation with atomic writes
//! - `memory`: In-memory implementation
//! - `models`: Session and settings record types
//! - `persistent`: Typed best-effort store used by controllers

pub mod backend;
pub mod json;
pub mod memory;
pub mod models;
pub mod persistent;

pub use backend::KeyValueBackend;
pub use json::JsonFileBackend;
pub use memory::MemoryBackend;
pub use models::{SessionRecord, SettingsRecord, Theme};
pub use persistent::{PersistentStore, FAVORITES_KEY, SESSION_KEY, SETTINGS_KEY};
