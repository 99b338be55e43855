//! Access to the external, read-only country dataset.
//!
//! - `client`: [`CountryDataGateway`] trait and the HTTP implementation
//! - `payload`: wire format decoding

pub mod client;
mod payload;

pub use client::{CountryDataGateway, FetchResult, GatewayConfig, RestCountriesGateway, DEFAULT_BASE_URL};
