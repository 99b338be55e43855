//! Country data gateway trait and its HTTP implementation.
//!
//! [`CountryDataGateway`] is the seam between the controllers and the external
//! read-only API. [`RestCountriesGateway`] implements it with `reqwest` against
//! a REST Countries v3.1 compatible origin:
//!
//! | Operation          | Request                         |
//! |--------------------|---------------------------------|
//! | `fetch_all`        | `GET {base}/all`                |
//! | `fetch_by_name`    | `GET {base}/name/{name}`        |
//! | `fetch_by_region`  | `GET {base}/region/{region}`    |
//! | `fetch_by_code`    | `GET {base}/alpha/{code}`       |
//! | `fetch_by_codes`   | `GET {base}/alpha?codes=a,b,c`  |
//!
//! A 404 from the name and code lookups means "nothing matched" and is
//! returned as an empty list. Every other failure becomes a
//! [`DataFetchError`].

use crate::domain::error::{DataFetchError, ExplorerError, FetchFailure, FetchOperation, Result};
use crate::domain::{Country, Region};
use crate::gateway::payload::decode_countries;
use futures_util::future::{self, BoxFuture, FutureExt};
use reqwest::StatusCode;
use std::collections::HashSet;
use std::time::Duration;
use tracing::Instrument;
use url::Url;

/// Default API origin.
pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";

/// Outcome of one gateway call.
pub type FetchResult = std::result::Result<Vec<Country>, DataFetchError>;

/// Read-only access to the external country dataset.
///
/// Implementations must be all-or-nothing per call: either every record decoded
/// or an error. Futures are boxed so the trait stays object safe and the
/// futures can be moved into spawned tasks.
pub trait CountryDataGateway: Send + Sync {
    /// Full dataset snapshot.
    fn fetch_all(&self) -> BoxFuture<'_, FetchResult>;

    /// Countries whose name partially matches `name`, per the source's rules.
    fn fetch_by_name<'a>(&'a self, name: &'a str) -> BoxFuture<'a, FetchResult>;

    /// Countries in `region`.
    fn fetch_by_region(&self, region: Region) -> BoxFuture<'_, FetchResult>;

    /// The country with `code`; zero or one record expected.
    fn fetch_by_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, FetchResult>;

    /// Batched code lookup. An empty `codes` slice must resolve to an empty
    /// list without touching the network.
    fn fetch_by_codes<'a>(&'a self, codes: &'a [String]) -> BoxFuture<'a, FetchResult>;
}

/// Settings for [`RestCountriesGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// API origin including the version path, e.g. `https://restcountries.com/v3.1`.
    pub base_url: String,
    pub timeout: Duration,
    /// Optional `fields=` projection appended to every request.
    pub fields: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            fields: Vec::new(),
        }
    }
}

/// HTTP implementation of [`CountryDataGateway`].
#[derive(Debug, Clone)]
pub struct RestCountriesGateway {
    client: reqwest::Client,
    base_url: Url,
    fields: Vec<String>,
}

impl RestCountriesGateway {
    /// Builds the gateway and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Config`] if the base URL is not an absolute
    /// hierarchical URL or the HTTP client cannot be constructed.
    ///
    /// # Examples
    ///
    /// ```
    /// use country_explorer::gateway::{GatewayConfig, RestCountriesGateway};
    ///
    /// let gateway = RestCountriesGateway::new(&GatewayConfig::default())?;
    /// assert_eq!(gateway.base_url().as_str(), "https://restcountries.com/v3.1");
    /// # Ok::<(), country_explorer::ExplorerError>(())
    /// ```
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ExplorerError::Config(format!("invalid base_url {:?}: {e}", config.base_url)))?;

        if base_url.cannot_be_a_base() {
            return Err(ExplorerError::Config(format!(
                "base_url {:?} cannot carry path segments",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("country-explorer/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExplorerError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            fields: config.fields.clone(),
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path (percent-encoding each one) and
    /// adds the `fields` projection if configured.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !self.fields.is_empty() {
            url.query_pairs_mut().append_pair("fields", &self.fields.join(","));
        }
        url
    }

    async fn get(&self, operation: FetchOperation, url: Url, not_found_is_empty: bool) -> FetchResult {
        tracing::debug!(url = %url, "requesting countries");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataFetchError::new(operation, FetchFailure::Transport(e.to_string())))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND && not_found_is_empty {
            tracing::debug!("no countries matched");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "request rejected");
            return Err(DataFetchError::new(operation, FetchFailure::Status(status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DataFetchError::new(operation, FetchFailure::Transport(e.to_string())))?;

        let countries = decode_countries(&body)
            .map_err(|e| DataFetchError::new(operation, FetchFailure::Malformed(e)))?;

        tracing::debug!(count = countries.len(), "countries received");
        Ok(countries)
    }
}

impl CountryDataGateway for RestCountriesGateway {
    fn fetch_all(&self) -> BoxFuture<'_, FetchResult> {
        let url = self.endpoint(&["all"]);
        self.get(FetchOperation::All, url, false)
            .instrument(tracing::debug_span!("fetch_all"))
            .boxed()
    }

    fn fetch_by_name<'a>(&'a self, name: &'a str) -> BoxFuture<'a, FetchResult> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("empty name lookup, skipping request");
            return future::ready(Ok(Vec::new())).boxed();
        }
        let url = self.endpoint(&["name", name]);
        self.get(FetchOperation::ByName, url, true)
            .instrument(tracing::debug_span!("fetch_by_name", name = %name))
            .boxed()
    }

    fn fetch_by_region(&self, region: Region) -> BoxFuture<'_, FetchResult> {
        let url = self.endpoint(&["region", region.as_str()]);
        self.get(FetchOperation::ByRegion, url, false)
            .instrument(tracing::debug_span!("fetch_by_region", region = %region))
            .boxed()
    }

    fn fetch_by_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, FetchResult> {
        let code = code.trim();
        if code.is_empty() {
            return future::ready(Ok(Vec::new())).boxed();
        }
        let url = self.endpoint(&["alpha", code]);
        self.get(FetchOperation::ByCode, url, true)
            .instrument(tracing::debug_span!("fetch_by_code", code = %code))
            .boxed()
    }

    fn fetch_by_codes<'a>(&'a self, codes: &'a [String]) -> BoxFuture<'a, FetchResult> {
        let mut seen = HashSet::with_capacity(codes.len());
        let unique: Vec<&str> = codes
            .iter()
            .map(|code| code.trim())
            .filter(|code| !code.is_empty() && seen.insert(*code))
            .collect();

        if unique.is_empty() {
            return future::ready(Ok(Vec::new())).boxed();
        }

        let mut url = self.endpoint(&["alpha"]);
        url.query_pairs_mut().append_pair("codes", &unique.join(","));

        self.get(FetchOperation::ByCodes, url, true)
            .instrument(tracing::debug_span!("fetch_by_codes", count = unique.len()))
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base_url: &str, fields: &[&str]) -> RestCountriesGateway {
        RestCountriesGateway::new(&GatewayConfig {
            base_url: base_url.to_string(),
            fields: fields.iter().map(ToString::to_string).collect(),
            ..GatewayConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_appends_encoded_segments() {
        let gw = gateway("https://example.test/v3.1/", &[]);
        assert_eq!(gw.endpoint(&["all"]).as_str(), "https://example.test/v3.1/all");
        assert_eq!(
            gw.endpoint(&["name", "united states"]).as_str(),
            "https://example.test/v3.1/name/united%20states"
        );
        assert_eq!(
            gw.endpoint(&["name", "a/b"]).as_str(),
            "https://example.test/v3.1/name/a%2Fb"
        );
    }

    #[test]
    fn endpoint_adds_field_projection() {
        let gw = gateway("https://example.test/v3.1", &["cca3", "name"]);
        let url = gw.endpoint(&["region", "Asia"]);
        assert_eq!(url.path(), "/v3.1/region/Asia");
        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "fields").map(|(_, v)| v.into_owned()),
            Some("cca3,name".to_string())
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for bad in ["not a url", "mailto:someone@example.test"] {
            let result = RestCountriesGateway::new(&GatewayConfig {
                base_url: bad.to_string(),
                ..GatewayConfig::default()
            });
            assert!(matches!(result, Err(ExplorerError::Config(_))), "{bad} accepted");
        }
    }
}
