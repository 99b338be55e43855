//! Country Explorer: the client-side data and state layer of a country catalog.
//!
//! The crate provides:
//! - Browsing, name search, region filtering, and pagination over a remote
//!   read-only country dataset (REST Countries v3.1 compatible)
//! - Single-country detail with neighbors and a map link
//! - A persisted favorites list, a local display-name session, and settings
//! - An event dispatcher the presentation layer drives

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Presentation layer (external)                      │
//! └─────────────────────────────────────────────────────┘
//!                        │ Event           ▲ ViewState
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - handle_event                                     │
//! │  - Query / Favorites / Session / Detail controllers │
//! └─────────────────────────────────────────────────────┘
//!               │                          │
//! ┌───────────────────────────┐   ┌───────────────────────┐
//! │ Gateway (gateway/)        │   │ Storage (storage/)    │
//! │ - reqwest HTTP client     │   │ - Typed records       │
//! │ - Wire format decoding    │   │ - JSON file backend   │
//! └───────────────────────────┘   └───────────────────────┘
//!               │                          │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain & Infrastructure                            │
//! │  - Country, Region, errors (domain/)                │
//! │  - Data directory paths (infrastructure/)           │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! [`Config`] is read from TOML; every key is optional:
//!
//! ```toml
//! base_url = "https://restcountries.com/v3.1"
//! request_timeout_secs = 10
//! fields = ["cca3", "name", "capital", "region", "population", "flags"]
//! data_dir = "~/.local/share/country-explorer"
//! trace_level = "country_explorer=debug"
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use country_explorer::{handle_event, initialize, Config, Event, Region};
//!
//! # async fn demo() -> country_explorer::Result<()> {
//! let mut explorer = initialize(&Config::default())?;
//! let mut view = explorer.query.subscribe();
//!
//! handle_event(&mut explorer, &Event::Refresh)?;
//! handle_event(&mut explorer, &Event::RegionSelected(Some(Region::Europe)))?;
//!
//! view.changed().await.ok();
//! for country in view.borrow().visible() {
//!     println!("{} ({})", country.common_name, country.code);
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod domain;
pub mod gateway;
pub mod infrastructure;
pub mod observability;
pub mod storage;

pub use app::{handle_event, Event, Landing, ListingPhase, QueryStatus, ViewState};
pub use domain::{Country, DataFetchError, ExplorerError, Region, Result};

use app::{DetailController, FavoritesController, QueryController, SessionController};
use gateway::{CountryDataGateway, GatewayConfig, RestCountriesGateway, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use storage::{JsonFileBackend, PersistentStore, SettingsRecord};

/// Name of the storage file inside the data directory.
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// API origin including the version path. Default: `https://restcountries.com/v3.1`
    pub base_url: String,

    /// Per-request timeout. Must be positive. Default: 10
    pub request_timeout_secs: u64,

    /// Response fields to request. Empty means the full record.
    pub fields: Vec<String>,

    /// Directory for the storage and trace files. A leading `~` is expanded.
    ///
    /// Default: the platform local data directory plus `country-explorer`.
    pub data_dir: Option<String>,

    /// `EnvFilter` directive for exported spans. Default: unset, and then
    /// [`initialize`] installs no tracing.
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
            fields: Vec::new(),
            data_dir: None,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses TOML text, filling unspecified keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Config`] for invalid TOML, unknown keys, or a
    /// zero timeout.
    ///
    /// # Examples
    ///
    /// ```
    /// use country_explorer::Config;
    ///
    /// let config = Config::from_toml_str("request_timeout_secs = 5")?;
    /// assert_eq!(config.request_timeout_secs, 5);
    /// assert_eq!(config.base_url, "https://restcountries.com/v3.1");
    /// # Ok::<(), country_explorer::ExplorerError>(())
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ExplorerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = ?path, "loading configuration");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(ExplorerError::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Resolved data directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map_or_else(infrastructure::default_data_dir, infrastructure::expand_tilde)
    }

    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir().join(STORAGE_FILE_NAME)
    }

    /// Span export file, next to the storage file.
    #[must_use]
    pub fn trace_file_path(&self) -> PathBuf {
        self.data_dir().join(observability::TRACE_FILE_NAME)
    }

    #[must_use]
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            fields: self.fields.clone(),
        }
    }
}

/// All controllers, wired to one store and one gateway.
#[derive(Debug)]
pub struct Explorer {
    pub store: PersistentStore,
    pub query: QueryController,
    pub favorites: FavoritesController,
    pub session: SessionController,
    pub detail: DetailController,
}

impl Explorer {
    /// Wires the controllers. Favorites are loaded from `store` immediately.
    pub fn new(store: PersistentStore, gateway: Arc<dyn CountryDataGateway>) -> Self {
        Self {
            query: QueryController::new(Arc::clone(&gateway)),
            favorites: FavoritesController::new(store.clone(), Arc::clone(&gateway)),
            session: SessionController::new(store.clone()),
            detail: DetailController::new(gateway),
            store,
        }
    }

    /// Stored settings with defaults filled in.
    #[must_use]
    pub fn settings(&self) -> SettingsRecord {
        self.store.load_settings()
    }
}

/// Builds an [`Explorer`] backed by the JSON storage file and the HTTP
/// gateway described by `config`.
///
/// Installs tracing first when `config.trace_level` is set. No request is
/// sent until the first query event.
///
/// # Errors
///
/// - [`ExplorerError::Config`] for an unusable base URL
/// - [`ExplorerError::Io`] if the storage file cannot be opened
///
/// # Examples
///
/// ```no_run
/// use country_explorer::{initialize, Config, Landing};
///
/// let explorer = initialize(&Config::default())?;
/// match explorer.session.landing() {
///     Landing::Login => println!("show login"),
///     Landing::Catalog(user) => println!("welcome back, {}", user.display_name),
/// }
/// # Ok::<(), country_explorer::ExplorerError>(())
/// ```
pub fn initialize(config: &Config) -> Result<Explorer> {
    if config.trace_level.is_some() {
        observability::init_tracing(config);
    }

    let _span = tracing::debug_span!("initialize").entered();
    config.validate()?;

    let gateway = RestCountriesGateway::new(&config.gateway_config())?;
    let backend = JsonFileBackend::open(config.storage_path())?;
    tracing::debug!(storage = ?backend.path(), base_url = %gateway.base_url(), "explorer initialized");

    Ok(Explorer::new(PersistentStore::new(backend), Arc::new(gateway)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn rejects_unknown_keys_and_zero_timeout() {
        assert!(matches!(Config::from_toml_str("scan_depth = 4"), Err(ExplorerError::Config(_))));
        assert!(matches!(
            Config::from_toml_str("request_timeout_secs = 0"),
            Err(ExplorerError::Config(_))
        ));
    }

    #[test]
    fn paths_follow_data_dir() {
        let config = Config::from_toml_str(
            r#"
            data_dir = "/tmp/explorer"
            fields = ["cca3", "name"]
            "#,
        )
        .unwrap();
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/explorer/storage.json"));
        assert_eq!(
            config.trace_file_path(),
            PathBuf::from("/tmp/explorer/country-explorer-trace.json")
        );
        assert_eq!(config.gateway_config().fields, vec!["cca3", "name"]);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explorer.toml");
        std::fs::write(&path, "base_url = \"http://localhost:9000/v3.1\"").unwrap();
        assert_eq!(Config::load(&path).unwrap().base_url, "http://localhost:9000/v3.1");
        assert!(matches!(Config::load(&dir.path().join("missing.toml")), Err(ExplorerError::Io(_))));
    }

    #[test]
    fn initialize_opens_storage_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_string_lossy().into_owned()),
            ..Config::default()
        };

        let explorer = initialize(&config).unwrap();
        explorer.store.save_favorites(&["USA".to_string()]);
        assert!(dir.path().join(STORAGE_FILE_NAME).exists());
        assert_eq!(explorer.session.landing(), Landing::Login);
    }

    #[test]
    fn initialize_rejects_bad_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            base_url: "not a url".to_string(),
            data_dir: Some(dir.path().to_string_lossy().into_owned()),
            ..Config::default()
        };
        assert!(matches!(initialize(&config), Err(ExplorerError::Config(_))));
    }
}
