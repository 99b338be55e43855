//! Wire format of the external country API.
//!
//! These types mirror the REST Countries v3.1 JSON shape and exist only to be
//! converted into [`Country`]. Decoding is all-or-nothing: a single record
//! that does not fit fails the whole body.

use crate::domain::{Coordinates, Country, Currency, FlagImages};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Deserialize)]
struct CountryPayload {
    cca3: String,
    name: NamePayload,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    subregion: Option<String>,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    flags: FlagImages,
    #[serde(default)]
    languages: BTreeMap<String, String>,
    #[serde(default)]
    currencies: BTreeMap<String, CurrencyPayload>,
    #[serde(default)]
    borders: Vec<String>,
    #[serde(default)]
    latlng: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct NamePayload {
    common: String,
    #[serde(default)]
    official: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrencyPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: Option<String>,
}

impl From<CountryPayload> for Country {
    fn from(payload: CountryPayload) -> Self {
        let coordinates = match payload.latlng.as_slice() {
            [latitude, longitude] => Some(Coordinates {
                latitude: *latitude,
                longitude: *longitude,
            }),
            _ => None,
        };

        Self {
            code: payload.cca3,
            official_name: payload
                .name
                .official
                .unwrap_or_else(|| payload.name.common.clone()),
            common_name: payload.name.common,
            capitals: payload.capital,
            region: non_empty(payload.region),
            subregion: non_empty(payload.subregion),
            population: payload.population,
            flags: payload.flags,
            languages: payload.languages,
            currencies: payload
                .currencies
                .into_iter()
                .map(|(code, c)| {
                    (
                        code,
                        Currency {
                            name: c.name,
                            symbol: non_empty(c.symbol),
                        },
                    )
                })
                .collect(),
            border_codes: payload.borders,
            coordinates,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Decodes a response body into countries, unique by code.
///
/// Accepts a JSON array of country objects, or a single bare object (some
/// code lookups answer that way). Duplicate codes keep their first occurrence.
///
/// # Errors
///
/// Returns a description of the problem if the body is not JSON, is neither
/// an array nor an object, or any record is missing required fields.
pub(crate) fn decode_countries(body: &[u8]) -> Result<Vec<Country>, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;

    let payloads: Vec<CountryPayload> = match value {
        Value::Array(_) => serde_json::from_value(value).map_err(|e| e.to_string())?,
        Value::Object(_) => vec![serde_json::from_value(value).map_err(|e| e.to_string())?],
        _ => return Err("expected a JSON array of countries".to_string()),
    };

    let total = payloads.len();
    let mut seen = HashSet::with_capacity(total);
    let countries: Vec<Country> = payloads
        .into_iter()
        .map(Country::from)
        .filter(|country| seen.insert(country.code.clone()))
        .collect();

    if countries.len() != total {
        tracing::debug!(
            dropped = total - countries.len(),
            "dropped duplicate country codes from response"
        );
    }

    Ok(countries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USA: &str = r#"{
        "cca3": "USA",
        "name": {"common": "United States", "official": "United States of America"},
        "capital": ["Washington, D.C."],
        "region": "Americas",
        "subregion": "North America",
        "population": 329484123,
        "flags": {"png": "https://flagcdn.com/w320/us.png", "svg": "https://flagcdn.com/us.svg"},
        "languages": {"eng": "English"},
        "currencies": {"USD": {"name": "United States dollar", "symbol": "$"}},
        "borders": ["CAN", "MEX"],
        "latlng": [38.0, -97.0]
    }"#;

    #[test]
    fn decodes_full_record() {
        let body = format!("[{USA}]");
        let countries = decode_countries(body.as_bytes()).unwrap();
        assert_eq!(countries.len(), 1);

        let usa = &countries[0];
        assert_eq!(usa.code, "USA");
        assert_eq!(usa.common_name, "United States");
        assert_eq!(usa.official_name, "United States of America");
        assert_eq!(usa.primary_capital(), Some("Washington, D.C."));
        assert_eq!(usa.region.as_deref(), Some("Americas"));
        assert_eq!(usa.population, 329_484_123);
        assert_eq!(usa.flags.svg.as_deref(), Some("https://flagcdn.com/us.svg"));
        assert_eq!(usa.languages.get("eng").map(String::as_str), Some("English"));
        assert_eq!(usa.currencies["USD"].symbol.as_deref(), Some("$"));
        assert_eq!(usa.border_codes, vec!["CAN", "MEX"]);
        assert_eq!(
            usa.coordinates,
            Some(Coordinates { latitude: 38.0, longitude: -97.0 })
        );
    }

    #[test]
    fn optional_fields_default() {
        let body = br#"[{"cca3": "ATA", "name": {"common": "Antarctica"}, "region": "", "latlng": [1.0]}]"#;
        let countries = decode_countries(body).unwrap();
        let ata = &countries[0];
        assert_eq!(ata.official_name, "Antarctica");
        assert!(ata.capitals.is_empty());
        assert_eq!(ata.region, None);
        assert_eq!(ata.coordinates, None);
        assert!(ata.border_codes.is_empty());
    }

    #[test]
    fn one_bad_record_fails_the_body() {
        let body = format!(r#"[{USA}, {{"name": {{"common": "Nowhere"}}}}]"#);
        assert!(decode_countries(body.as_bytes()).is_err());
    }

    #[test]
    fn rejects_non_collection_bodies() {
        assert!(decode_countries(b"42").is_err());
        assert!(decode_countries(b"<html>").is_err());
    }

    #[test]
    fn accepts_single_object() {
        let countries = decode_countries(USA.as_bytes()).unwrap();
        assert_eq!(countries[0].code, "USA");
    }

    #[test]
    fn drops_duplicate_codes() {
        let body = format!("[{USA}, {USA}]");
        assert_eq!(decode_countries(body.as_bytes()).unwrap().len(), 1);
    }
}
