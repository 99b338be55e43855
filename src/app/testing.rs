//! In-memory gateway used by controller tests.

use crate::domain::error::{DataFetchError, FetchFailure, FetchOperation};
use crate::domain::{Country, Region};
use crate::gateway::{CountryDataGateway, FetchResult};
use futures_util::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    All,
    ByName(String),
    ByRegion(Region),
    ByCode(String),
    ByCodes(Vec<String>),
}

/// Serves a fixed country list, records every call, and can delay the full
/// list or name lookups, or fail on demand.
#[derive(Default)]
pub(crate) struct FakeGateway {
    countries: Vec<Country>,
    calls: Mutex<Vec<Call>>,
    all_delay: Mutex<Option<Duration>>,
    name_delays: Mutex<HashMap<String, Duration>>,
    failing: AtomicBool,
}

impl FakeGateway {
    pub(crate) fn with_countries(countries: Vec<Country>) -> Self {
        Self {
            countries,
            ..Self::default()
        }
    }

    pub(crate) fn delay_all(&self, delay: Duration) {
        *self.all_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn delay_name(&self, name: &str, delay: Duration) {
        self.name_delays.lock().unwrap().insert(name.to_string(), delay);
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(
        &self,
        call: Call,
        operation: FetchOperation,
        delay: Option<Duration>,
        keep: impl Fn(&Country) -> bool,
    ) -> BoxFuture<'_, FetchResult> {
        self.calls.lock().unwrap().push(call);
        let outcome = if self.failing.load(Ordering::SeqCst) {
            Err(DataFetchError::new(operation, FetchFailure::Status(500)))
        } else {
            Ok(self.countries.iter().filter(|c| keep(c)).cloned().collect())
        };
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            outcome
        }
        .boxed()
    }
}

impl CountryDataGateway for FakeGateway {
    fn fetch_all(&self) -> BoxFuture<'_, FetchResult> {
        let delay = *self.all_delay.lock().unwrap();
        self.respond(Call::All, FetchOperation::All, delay, |_| true)
    }

    fn fetch_by_name<'a>(&'a self, name: &'a str) -> BoxFuture<'a, FetchResult> {
        let delay = self.name_delays.lock().unwrap().get(name).copied();
        let needle = name.to_lowercase();
        self.respond(Call::ByName(name.to_string()), FetchOperation::ByName, delay, move |c| {
            c.common_name.to_lowercase().contains(&needle)
        })
    }

    fn fetch_by_region(&self, region: Region) -> BoxFuture<'_, FetchResult> {
        self.respond(Call::ByRegion(region), FetchOperation::ByRegion, None, move |c| {
            c.region.as_deref() == Some(region.as_str())
        })
    }

    fn fetch_by_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, FetchResult> {
        self.respond(Call::ByCode(code.to_string()), FetchOperation::ByCode, None, move |c| {
            c.code == code
        })
    }

    fn fetch_by_codes<'a>(&'a self, codes: &'a [String]) -> BoxFuture<'a, FetchResult> {
        self.respond(Call::ByCodes(codes.to_vec()), FetchOperation::ByCodes, None, move |c| {
            codes.contains(&c.code)
        })
    }
}

pub(crate) fn country(code: &str, name: &str, region: Region) -> Country {
    let mut country = Country::new(code, name);
    country.region = Some(region.to_string());
    country
}

/// A handful of countries, three of which match "United".
pub(crate) fn sample_countries() -> Vec<Country> {
    vec![
        country("USA", "United States", Region::Americas),
        country("GBR", "United Kingdom", Region::Europe),
        country("ARE", "United Arab Emirates", Region::Asia),
        country("FRA", "France", Region::Europe),
        country("JPN", "Japan", Region::Asia),
    ]
}
