//! Single-country detail page.

use crate::app::favorites::FavoritesController;
use crate::domain::error::{DataFetchError, ExplorerError, Result};
use crate::domain::Country;
use crate::gateway::CountryDataGateway;
use std::sync::Arc;
use tracing::Instrument;

/// Everything the detail page renders for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryDetail {
    pub country: Country,
    pub is_favorite: bool,
    /// External map link for the country.
    pub maps_url: String,
}

pub struct DetailController {
    gateway: Arc<dyn CountryDataGateway>,
}

impl DetailController {
    #[must_use]
    pub fn new(gateway: Arc<dyn CountryDataGateway>) -> Self {
        Self { gateway }
    }

    /// Loads `code` and marks whether it is a favorite.
    ///
    /// # Errors
    ///
    /// - [`ExplorerError::CountryNotFound`] if no country has this code
    /// - [`ExplorerError::DataFetch`] if the lookup fails
    pub async fn load(&self, code: &str, favorites: &FavoritesController) -> Result<CountryDetail> {
        let span = tracing::debug_span!("load_detail", code = %code);
        let countries = self.gateway.fetch_by_code(code).instrument(span).await?;

        let Some(country) = countries.into_iter().next() else {
            tracing::debug!(code = %code, "country not found");
            return Err(ExplorerError::CountryNotFound(code.to_string()));
        };

        Ok(CountryDetail {
            is_favorite: favorites.contains(&country.code),
            maps_url: country.maps_url(),
            country,
        })
    }

    /// Countries sharing a border with `country`. No request is made for
    /// countries without land borders.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`DataFetchError`].
    pub async fn neighbors(&self, country: &Country) -> std::result::Result<Vec<Country>, DataFetchError> {
        if country.border_codes.is_empty() {
            return Ok(Vec::new());
        }
        self.gateway
            .fetch_by_codes(&country.border_codes)
            .instrument(tracing::debug_span!("load_neighbors", code = %country.code))
            .await
    }

    /// Flips the favorite state of the shown country and returns it.
    pub fn toggle_favorite(&self, detail: &mut CountryDetail, favorites: &mut FavoritesController) -> bool {
        detail.is_favorite = favorites.toggle(&detail.country.code);
        detail.is_favorite
    }
}

impl std::fmt::Debug for DetailController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailController").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{sample_countries, Call, FakeGateway};
    use crate::storage::{MemoryBackend, PersistentStore};

    fn setup() -> (Arc<FakeGateway>, DetailController, FavoritesController) {
        let mut countries = sample_countries();
        countries[3].border_codes = vec!["ESP".into(), "DEU".into()];
        let gateway = Arc::new(FakeGateway::with_countries(countries));
        let shared = Arc::clone(&gateway) as Arc<dyn CountryDataGateway>;
        let favorites = FavoritesController::new(PersistentStore::new(MemoryBackend::new()), Arc::clone(&shared));
        (gateway, DetailController::new(shared), favorites)
    }

    #[tokio::test]
    async fn load_marks_favorite_state() {
        let (_, detail, mut favorites) = setup();
        favorites.add("USA");

        let shown = detail.load("USA", &favorites).await.unwrap();
        assert_eq!(shown.country.common_name, "United States");
        assert!(shown.is_favorite);
        assert_eq!(shown.maps_url, shown.country.maps_url());
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let (_, detail, favorites) = setup();
        let result = detail.load("XYZ", &favorites).await;
        assert!(matches!(result, Err(ExplorerError::CountryNotFound(code)) if code == "XYZ"));
    }

    #[tokio::test]
    async fn failed_lookup_is_a_fetch_error() {
        let (gateway, detail, favorites) = setup();
        gateway.set_failing(true);
        assert!(matches!(
            detail.load("USA", &favorites).await,
            Err(ExplorerError::DataFetch(_))
        ));
    }

    #[tokio::test]
    async fn neighbors_skip_request_without_borders() {
        let (gateway, detail, favorites) = setup();
        let japan = detail.load("JPN", &favorites).await.unwrap().country;
        assert!(detail.neighbors(&japan).await.unwrap().is_empty());
        assert_eq!(gateway.calls(), vec![Call::ByCode("JPN".into())]);

        let france = detail.load("FRA", &favorites).await.unwrap().country;
        detail.neighbors(&france).await.unwrap();
        assert_eq!(
            gateway.calls().last(),
            Some(&Call::ByCodes(vec!["ESP".into(), "DEU".into()]))
        );
    }

    #[tokio::test]
    async fn toggle_updates_detail_and_list() {
        let (_, detail, mut favorites) = setup();
        let mut shown = detail.load("FRA", &favorites).await.unwrap();
        assert!(!shown.is_favorite);

        assert!(detail.toggle_favorite(&mut shown, &mut favorites));
        assert!(favorites.contains("FRA"));
        assert!(!detail.toggle_favorite(&mut shown, &mut favorites));
        assert!(!shown.is_favorite);
    }
}
