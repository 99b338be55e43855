//! Personal favorites list.
//!
//! Favorites are country codes kept in insertion order, with no duplicates.
//! Every mutation writes the whole list back through [`PersistentStore`], so
//! the stored array always mirrors the in-memory one after a call returns.
//! If the write itself fails the in-memory list stays authoritative until the
//! next [`FavoritesController::reload`].

use crate::domain::error::DataFetchError;
use crate::domain::Country;
use crate::gateway::CountryDataGateway;
use crate::storage::PersistentStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::Instrument;

/// Set semantics over the persisted favorite codes.
///
/// # Examples
///
/// ```
/// use country_explorer::app::FavoritesController;
/// use country_explorer::gateway::{GatewayConfig, RestCountriesGateway};
/// use country_explorer::storage::{MemoryBackend, PersistentStore};
/// use std::sync::Arc;
///
/// let store = PersistentStore::new(MemoryBackend::new());
/// let gateway = Arc::new(RestCountriesGateway::new(&GatewayConfig::default())?);
/// let mut favorites = FavoritesController::new(store.clone(), gateway);
///
/// assert!(favorites.toggle("usa"));
/// assert!(favorites.contains("USA"));
/// assert_eq!(store.load_favorites(), vec!["USA".to_string()]);
/// # Ok::<(), country_explorer::ExplorerError>(())
/// ```
pub struct FavoritesController {
    store: PersistentStore,
    gateway: Arc<dyn CountryDataGateway>,
    codes: Vec<String>,
    index: HashSet<String>,
}

/// Canonical form of a country code: trimmed and upper-case.
fn normalize(code: &str) -> Option<String> {
    let code = code.trim();
    (!code.is_empty()).then(|| code.to_ascii_uppercase())
}

impl FavoritesController {
    /// Creates the controller and loads the stored list.
    pub fn new(store: PersistentStore, gateway: Arc<dyn CountryDataGateway>) -> Self {
        let mut controller = Self {
            store,
            gateway,
            codes: Vec::new(),
            index: HashSet::new(),
        };
        controller.reload();
        controller
    }

    /// Re-reads the list from storage, dropping any entries that are blank or
    /// repeated.
    pub fn reload(&mut self) {
        let stored = self.store.load_favorites();
        let mut index = HashSet::with_capacity(stored.len());
        let codes: Vec<String> = stored
            .iter()
            .filter_map(|code| normalize(code))
            .filter(|code| index.insert(code.clone()))
            .collect();

        if codes.len() != stored.len() {
            tracing::debug!(
                stored = stored.len(),
                kept = codes.len(),
                "normalized stored favorites"
            );
        }

        self.codes = codes;
        self.index = index;
    }

    /// Favorite codes in the order they were added.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.codes.clone()
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        normalize(code).is_some_and(|code| self.index.contains(&code))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Adds `code` if absent. Returns `true` if the list changed.
    pub fn add(&mut self, code: &str) -> bool {
        let Some(code) = normalize(code) else {
            tracing::debug!("ignoring blank favorite code");
            return false;
        };
        if !self.index.insert(code.clone()) {
            return false;
        }
        tracing::debug!(code = %code, "favorite added");
        self.codes.push(code);
        self.persist();
        true
    }

    /// Removes `code` if present. Returns `true` if the list changed.
    pub fn remove(&mut self, code: &str) -> bool {
        let Some(code) = normalize(code) else {
            return false;
        };
        if !self.index.remove(&code) {
            return false;
        }
        tracing::debug!(code = %code, "favorite removed");
        self.codes.retain(|existing| *existing != code);
        self.persist();
        true
    }

    /// Flips membership of `code` and returns the new membership.
    pub fn toggle(&mut self, code: &str) -> bool {
        if self.contains(code) {
            self.remove(code);
            false
        } else {
            self.add(code)
        }
    }

    /// Fetches full records for `codes` in one batched lookup.
    ///
    /// An empty input resolves immediately without a request.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`DataFetchError`].
    pub async fn resolve_details(&self, codes: &[String]) -> Result<Vec<Country>, DataFetchError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        self.gateway
            .fetch_by_codes(codes)
            .instrument(tracing::debug_span!("resolve_favorites", count = codes.len()))
            .await
    }

    /// Full records for every favorite.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`DataFetchError`].
    pub async fn resolve_all(&self) -> Result<Vec<Country>, DataFetchError> {
        let codes = self.list();
        self.resolve_details(&codes).await
    }

    fn persist(&self) {
        self.store.save_favorites(&self.codes);
    }
}

impl std::fmt::Debug for FavoritesController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesController")
            .field("codes", &self.codes)
            .finish_non_exhaustive()
    }
}
