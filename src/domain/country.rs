//! Country domain model.
//!
//! [`Country`] is the record consumed by the core. It is decoded from the
//! external API's wire shape by the gateway and is otherwise treated as opaque:
//! the core only relies on `code` being unique within one result set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

const MAPS_BASE: &str = "https://www.google.com/maps";

/// A single country from the external dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Three-letter alpha code (cca3). Primary key for favorites, routing and borders.
    pub code: String,

    pub common_name: String,

    pub official_name: String,

    /// Capital cities in source order. Empty for territories without one.
    pub capitals: Vec<String>,

    pub region: Option<String>,

    pub subregion: Option<String>,

    pub population: u64,

    pub flags: FlagImages,

    /// Language code to language name.
    pub languages: BTreeMap<String, String>,

    /// Currency code to currency details.
    pub currencies: BTreeMap<String, Currency>,

    /// Neighboring country codes in source order. May reference codes that were
    /// never fetched.
    pub border_codes: Vec<String>,

    pub coordinates: Option<Coordinates>,
}

/// Flag image URIs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagImages {
    pub png: Option<String>,
    pub svg: Option<String>,
    /// Accessible description of the flag, when the source provides one.
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    pub symbol: Option<String>,
}

/// Geographic center of a country.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Country {
    /// Creates a country with only the identifying fields set.
    ///
    /// Everything else is empty. Mostly useful for fixtures and for callers
    /// building records from other sources.
    pub fn new(code: impl Into<String>, common_name: impl Into<String>) -> Self {
        let common_name = common_name.into();
        Self {
            code: code.into(),
            official_name: common_name.clone(),
            common_name,
            capitals: Vec::new(),
            region: None,
            subregion: None,
            population: 0,
            flags: FlagImages::default(),
            languages: BTreeMap::new(),
            currencies: BTreeMap::new(),
            border_codes: Vec::new(),
            coordinates: None,
        }
    }

    /// First listed capital, if any.
    #[must_use]
    pub fn primary_capital(&self) -> Option<&str> {
        self.capitals.first().map(String::as_str)
    }

    /// Population with `,` thousands separators, e.g. `331,002,651`.
    #[must_use]
    pub fn formatted_population(&self) -> String {
        let digits = self.population.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        grouped
    }

    /// Link to the country on an external map.
    ///
    /// Points at the country's center when coordinates are known, otherwise
    /// falls back to a name search.
    ///
    /// ```
    /// use country_explorer::domain::{Coordinates, Country};
    ///
    /// let mut country = Country::new("NZL", "New Zealand");
    /// assert_eq!(country.maps_url(), "https://www.google.com/maps/search/New%20Zealand");
    ///
    /// country.coordinates = Some(Coordinates { latitude: -41.0, longitude: 174.0 });
    /// assert_eq!(
    ///     country.maps_url(),
    ///     "https://www.google.com/maps/place/New%20Zealand/@-41,174,6z"
    /// );
    /// ```
    #[must_use]
    pub fn maps_url(&self) -> String {
        let Ok(mut url) = Url::parse(MAPS_BASE) else {
            return MAPS_BASE.to_string();
        };

        if let Ok(mut segments) = url.path_segments_mut() {
            match self.coordinates {
                Some(Coordinates { latitude, longitude }) => {
                    segments
                        .push("place")
                        .push(&self.common_name)
                        .push(&format!("@{latitude},{longitude},6z"));
                }
                None => {
                    segments.push("search").push(&self.common_name);
                }
            }
        }

        url.into()
    }
}
