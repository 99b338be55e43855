//! Catalog query state machine.
//!
//! [`QueryController`] owns the catalog [`ViewState`]: the current search term
//! and region filter, the last result set, pagination, and the load status.
//! Every change to the inputs issues exactly one request against the
//! [`CountryDataGateway`]:
//!
//! ```text
//!            set_search_term / set_region / refresh
//!   Idle ──────────────────────────────────────────▶ Loading
//!                                                  │       │
//!                                        Ok(list)  │       │ Err(e)
//!                                                  ▼       ▼
//!                                              Loaded    Failed
//! ```
//!
//! Name searches wait for [`SEARCH_DEBOUNCE`] before being sent; a newer
//! keystroke aborts the pending timer. Requests that are already in flight
//! are never cancelled. Instead each one carries the generation it was issued
//! under, and its completion is dropped unless that generation is still
//! current.
//!
//! State is published through a `tokio::sync::watch` channel so the
//! presentation layer can either poll [`QueryController::snapshot`] or await
//! changes on [`QueryController::subscribe`].

use crate::app::pagination::{self, PAGE_SIZE};
use crate::domain::error::{DataFetchError, FetchFailure, FetchOperation};
use crate::domain::{Country, Region};
use crate::gateway::{CountryDataGateway, FetchResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Quiet period after the last search keystroke before a name query is sent.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// User-facing message for any failed catalog load.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load countries. Please try again later.";

/// The request implied by the current inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySpec {
    All,
    ByName(String),
    ByRegion(Region),
}

impl QuerySpec {
    /// Derives the request from the inputs. A non-blank search term wins over
    /// the region filter; with neither, the full list is requested.
    ///
    /// # Examples
    ///
    /// ```
    /// use country_explorer::app::QuerySpec;
    /// use country_explorer::Region;
    ///
    /// assert_eq!(QuerySpec::derive("  ", Some(Region::Asia)), QuerySpec::ByRegion(Region::Asia));
    /// assert_eq!(
    ///     QuerySpec::derive(" United ", Some(Region::Asia)),
    ///     QuerySpec::ByName("United".into())
    /// );
    /// assert_eq!(QuerySpec::derive("", None), QuerySpec::All);
    /// ```
    #[must_use]
    pub fn derive(search_term: &str, region: Option<Region>) -> Self {
        let term = search_term.trim();
        if !term.is_empty() {
            return Self::ByName(term.to_string());
        }
        region.map_or(Self::All, Self::ByRegion)
    }

    #[must_use]
    pub const fn operation(&self) -> FetchOperation {
        match self {
            Self::All => FetchOperation::All,
            Self::ByName(_) => FetchOperation::ByName,
            Self::ByRegion(_) => FetchOperation::ByRegion,
        }
    }

    /// Only name searches follow keystrokes, so only they are debounced.
    const fn is_debounced(&self) -> bool {
        matches!(self, Self::ByName(_))
    }

    async fn run(self, gateway: &dyn CountryDataGateway) -> FetchResult {
        match self {
            Self::All => gateway.fetch_all().await,
            Self::ByName(name) => gateway.fetch_by_name(&name).await,
            Self::ByRegion(region) => gateway.fetch_by_region(region).await,
        }
    }
}

/// Load status of the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What the listing area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPhase {
    Idle,
    Loading,
    Failed,
    /// The query succeeded and matched nothing.
    Empty,
    Populated,
}

/// A load failure as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewError {
    pub operation: FetchOperation,
    pub message: String,
}

impl ViewError {
    fn load_failed(operation: FetchOperation) -> Self {
        Self {
            operation,
            message: LOAD_FAILED_MESSAGE.to_string(),
        }
    }
}

/// Immutable snapshot of the catalog view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub search_term: String,
    pub region: Option<Region>,
    pub results: Vec<Country>,
    /// 1-based, always within `1..=total_pages()`.
    pub page: usize,
    pub page_size: usize,
    pub status: QueryStatus,
    pub error: Option<ViewError>,
    generation: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            region: None,
            results: Vec::new(),
            page: 1,
            page_size: PAGE_SIZE,
            status: QueryStatus::Idle,
            error: None,
            generation: 0,
        }
    }
}

impl ViewState {
    #[must_use]
    pub fn loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    #[must_use]
    pub fn phase(&self) -> ListingPhase {
        match self.status {
            QueryStatus::Idle => ListingPhase::Idle,
            QueryStatus::Loading => ListingPhase::Loading,
            QueryStatus::Failed => ListingPhase::Failed,
            QueryStatus::Loaded if self.results.is_empty() => ListingPhase::Empty,
            QueryStatus::Loaded => ListingPhase::Populated,
        }
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.results.len(), self.page_size)
    }

    /// Countries on the current page.
    #[must_use]
    pub fn visible(&self) -> &[Country] {
        pagination::visible_page(&self.results, self.page, self.page_size)
    }

    /// The request these inputs map to.
    #[must_use]
    pub fn query(&self) -> QuerySpec {
        QuerySpec::derive(&self.search_term, self.region)
    }

    /// Folds a completed request into the state if it is still current.
    ///
    /// Returns `false` (leaving the state untouched) for stale completions.
    fn apply(&mut self, generation: u64, outcome: FetchResult) -> bool {
        if generation != self.generation {
            return false;
        }
        match outcome {
            Ok(countries) => {
                tracing::debug!(count = countries.len(), "query loaded");
                self.results = countries;
                self.status = QueryStatus::Loaded;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "query failed");
                self.results.clear();
                self.status = QueryStatus::Failed;
                self.error = Some(ViewError::load_failed(e.operation));
            }
        }
        self.page = 1;
        true
    }
}

/// Drives catalog queries and publishes [`ViewState`] snapshots.
///
/// Must be used from within a tokio runtime; requests run on spawned tasks.
/// Dropping the controller aborts a pending debounce timer.
///
/// # Examples
///
/// ```no_run
/// use country_explorer::app::QueryController;
/// use country_explorer::gateway::{GatewayConfig, RestCountriesGateway};
/// use std::sync::Arc;
///
/// # async fn demo() -> country_explorer::Result<()> {
/// let gateway = Arc::new(RestCountriesGateway::new(&GatewayConfig::default())?);
/// let mut query = QueryController::new(gateway);
/// let mut updates = query.subscribe();
///
/// query.refresh();
/// updates.changed().await.ok();
/// println!("{} countries", updates.borrow().results.len());
/// # Ok(())
/// # }
/// ```
pub struct QueryController {
    gateway: Arc<dyn CountryDataGateway>,
    state: Arc<watch::Sender<ViewState>>,
    debounce: Option<JoinHandle<()>>,
}

impl QueryController {
    #[must_use]
    pub fn new(gateway: Arc<dyn CountryDataGateway>) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self {
            gateway,
            state: Arc::new(state),
            debounce: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Updates the search term and issues the derived query.
    ///
    /// Returns `false` without doing anything if the term is unchanged.
    pub fn set_search_term(&mut self, text: &str) -> bool {
        let changed = self.state.send_if_modified(|state| {
            if state.search_term == text {
                return false;
            }
            state.search_term = text.to_string();
            true
        });
        if changed {
            self.issue();
        }
        changed
    }

    /// Updates the region filter and issues the derived query.
    ///
    /// Returns `false` without doing anything if the region is unchanged.
    pub fn set_region(&mut self, region: Option<Region>) -> bool {
        let changed = self.state.send_if_modified(|state| {
            if state.region == region {
                return false;
            }
            state.region = region;
            true
        });
        if changed {
            self.issue();
        }
        changed
    }

    /// Re-issues the current query immediately, skipping the debounce.
    ///
    /// Used for the initial load and for retry after a failure.
    pub fn refresh(&mut self) {
        self.cancel_debounce();
        let (generation, spec) = self.begin();
        self.spawn_fetch(generation, spec);
    }

    /// Moves to `page` if it exists for the current results.
    pub fn set_page(&mut self, page: usize) -> bool {
        let mut accepted = false;
        self.state.send_if_modified(|state| {
            accepted = pagination::is_valid_page(page, state.results.len(), state.page_size);
            if !accepted || state.page == page {
                return false;
            }
            state.page = page;
            true
        });
        if !accepted {
            tracing::debug!(page, "rejected out of range page");
        }
        accepted
    }

    /// Hides the error banner. The status stays `Failed` until the next load.
    pub fn dismiss_error(&mut self) -> bool {
        self.state.send_if_modified(|state| state.error.take().is_some())
    }

    /// Aborts a pending debounce timer. Requests already sent still complete.
    pub fn shutdown(&mut self) {
        self.cancel_debounce();
    }

    fn cancel_debounce(&mut self) {
        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }
    }

    /// Starts a new generation and marks the view as loading.
    fn begin(&self) -> (u64, QuerySpec) {
        let mut issued = (0, QuerySpec::All);
        self.state.send_modify(|state| {
            state.generation += 1;
            state.status = QueryStatus::Loading;
            state.error = None;
            state.page = 1;
            issued = (state.generation, state.query());
        });
        issued
    }

    fn issue(&mut self) {
        self.cancel_debounce();
        let (generation, spec) = self.begin();

        if !spec.is_debounced() {
            self.spawn_fetch(generation, spec);
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.fail_without_runtime(generation, &spec);
            return;
        };

        let gateway = Arc::clone(&self.gateway);
        let state = Arc::clone(&self.state);
        let span = tracing::debug_span!("debounced_query", generation, query = ?spec);
        let timer = async move {
            tokio::time::sleep(SEARCH_DEBOUNCE).await;
            tracing::debug!("debounce elapsed, sending query");
            tokio::spawn(fetch(gateway, state, generation, spec).in_current_span());
        };
        self.debounce = Some(runtime.spawn(timer.instrument(span)));
    }

    fn spawn_fetch(&self, generation: u64, spec: QuerySpec) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.fail_without_runtime(generation, &spec);
            return;
        };
        let span = tracing::debug_span!("query", generation, query = ?spec);
        let task = fetch(Arc::clone(&self.gateway), Arc::clone(&self.state), generation, spec);
        runtime.spawn(task.instrument(span));
    }

    fn fail_without_runtime(&self, generation: u64, spec: &QuerySpec) {
        tracing::error!("query issued outside of a tokio runtime");
        let error = DataFetchError::new(
            spec.operation(),
            FetchFailure::Transport("no async runtime available".to_string()),
        );
        self.state.send_if_modified(|state| state.apply(generation, Err(error)));
    }
}

impl Drop for QueryController {
    fn drop(&mut self) {
        self.cancel_debounce();
    }
}

impl std::fmt::Debug for QueryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryController")
            .field("state", &*self.state.borrow())
            .field("debounce_pending", &self.debounce.as_ref().is_some_and(|t| !t.is_finished()))
            .finish_non_exhaustive()
    }
}

async fn fetch(
    gateway: Arc<dyn CountryDataGateway>,
    state: Arc<watch::Sender<ViewState>>,
    generation: u64,
    spec: QuerySpec,
) {
    let outcome = spec.run(gateway.as_ref()).await;
    if !state.send_if_modified(|view| view.apply(generation, outcome)) {
        tracing::debug!(generation, "discarding stale query result");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{country, sample_countries, Call, FakeGateway};

    fn controller(gateway: &Arc<FakeGateway>) -> QueryController {
        QueryController::new(Arc::clone(gateway) as Arc<dyn CountryDataGateway>)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn starts_idle_until_refreshed() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        let mut query = controller(&gateway);
        assert_eq!(query.snapshot().phase(), ListingPhase::Idle);

        query.refresh();
        assert!(query.snapshot().loading());

        settle().await;
        let view = query.snapshot();
        assert_eq!(view.status, QueryStatus::Loaded);
        assert_eq!(view.results.len(), 5);
        assert_eq!(gateway.calls(), vec![Call::All]);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_send_one_request() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        let mut query = controller(&gateway);

        for term in ["U", "Un", "United"] {
            query.set_search_term(term);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(gateway.calls().is_empty());

        settle().await;
        assert_eq!(gateway.calls(), vec![Call::ByName("United".into())]);
        assert_eq!(query.snapshot().results.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_discarded() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        gateway.delay_name("Fr", Duration::from_millis(1000));
        gateway.delay_name("Japan", Duration::from_millis(10));
        let mut query = controller(&gateway);

        query.set_search_term("Fr");
        // Past the debounce: the slow request is in flight.
        tokio::time::sleep(Duration::from_millis(400)).await;
        query.set_search_term("Japan");

        settle().await;
        assert_eq!(
            gateway.calls(),
            vec![Call::ByName("Fr".into()), Call::ByName("Japan".into())]
        );
        let view = query.snapshot();
        assert_eq!(view.search_term, "Japan");
        let codes: Vec<_> = view.results.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["JPN"]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_full_list_is_overtaken_by_later_search() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        gateway.delay_all(Duration::from_millis(1000));
        let mut query = controller(&gateway);

        query.refresh();
        tokio::time::sleep(Duration::from_millis(1)).await;
        query.set_search_term("Japan");

        // The name result lands first; the full list arrives later and is dropped.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(query.snapshot().status, QueryStatus::Loaded);

        settle().await;
        assert_eq!(gateway.calls(), vec![Call::All, Call::ByName("Japan".into())]);
        let view = query.snapshot();
        let codes: Vec<_> = view.results.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["JPN"]);
        assert_eq!(view.status, QueryStatus::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn search_then_clear_returns_to_full_list() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        let mut query = controller(&gateway);

        query.set_search_term("United");
        settle().await;
        let view = query.snapshot();
        assert_eq!(view.results.len(), 3);
        assert_eq!(view.page, 1);

        query.set_search_term("");
        // No debounce for the full list.
        tokio::task::yield_now().await;
        settle().await;
        let view = query.snapshot();
        assert_eq!(view.results.len(), 5);
        assert_eq!(view.page, 1);
        assert_eq!(gateway.calls().last(), Some(&Call::All));
    }

    #[tokio::test(start_paused = true)]
    async fn region_filter_is_immediate_and_name_takes_precedence() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        let mut query = controller(&gateway);

        query.set_region(Some(Region::Europe));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(gateway.calls(), vec![Call::ByRegion(Region::Europe)]);
        assert_eq!(query.snapshot().results.len(), 2);

        query.set_search_term("United");
        settle().await;
        assert_eq!(gateway.calls().last(), Some(&Call::ByName("United".into())));
        assert_eq!(query.snapshot().results.len(), 3);

        assert!(!query.set_region(Some(Region::Europe)));
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_inputs_issue_nothing() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        let mut query = controller(&gateway);

        assert!(!query.set_search_term(""));
        assert!(!query.set_region(None));
        settle().await;
        assert!(gateway.calls().is_empty());
        assert_eq!(query.snapshot().status, QueryStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn pagination_bounds() {
        let countries = (0..25).map(|i| country(&format!("C{i:02}"), &format!("Country {i}"), Region::Africa));
        let gateway = Arc::new(FakeGateway::with_countries(countries.collect()));
        let mut query = controller(&gateway);
        query.refresh();
        settle().await;

        assert_eq!(query.snapshot().total_pages(), 3);
        assert!(query.set_page(3));
        assert_eq!(query.snapshot().visible().len(), 1);
        assert!(!query.set_page(4));
        assert!(!query.set_page(0));
        assert_eq!(query.snapshot().page, 3);

        query.set_region(Some(Region::Africa));
        assert_eq!(query.snapshot().page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_shows_generic_message_until_dismissed() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        gateway.set_failing(true);
        let mut query = controller(&gateway);

        query.refresh();
        settle().await;
        let view = query.snapshot();
        assert_eq!(view.phase(), ListingPhase::Failed);
        assert!(view.results.is_empty());
        let error = view.error.unwrap();
        assert_eq!(error.operation, FetchOperation::All);
        assert_eq!(error.message, LOAD_FAILED_MESSAGE);

        assert!(query.dismiss_error());
        assert!(!query.dismiss_error());
        let view = query.snapshot();
        assert_eq!(view.error, None);
        assert_eq!(view.status, QueryStatus::Failed);

        gateway.set_failing(false);
        query.refresh();
        settle().await;
        assert_eq!(query.snapshot().phase(), ListingPhase::Populated);
    }

    #[tokio::test(start_paused = true)]
    async fn no_match_is_empty_not_failed() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        let mut query = controller(&gateway);

        query.set_search_term("Atlantis");
        settle().await;
        let view = query.snapshot();
        assert_eq!(view.phase(), ListingPhase::Empty);
        assert_eq!(view.error, None);
        assert_eq!(view.total_pages(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_search() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        let mut query = controller(&gateway);

        query.set_search_term("United");
        query.shutdown();
        settle().await;
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_loaded_state() {
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        let mut query = controller(&gateway);
        let mut updates = query.subscribe();

        query.refresh();
        updates.wait_for(|view| view.status == QueryStatus::Loaded).await.unwrap();
        assert_eq!(updates.borrow().results.len(), 5);
    }
}
