//! Domain layer for the country explorer core.
//!
//! This module contains the core domain types, independent of HTTP, storage,
//! or presentation concerns.
//!
//! # Organization
//!
//! - [`country`]: Country record and its display helpers
//! - [`region`]: Region filter enumeration
//! - [`error`]: Error types and result aliases
//!
//! # Examples
//!
//! ```
//! use country_explorer::domain::{Country, Region};
//!
//! let country = Country::new("USA", "United States of America");
//! assert_eq!(country.code, "USA");
//! assert_eq!("asia".parse::<Region>().unwrap(), Region::Asia);
//! ```

pub mod country;
pub mod error;
pub mod region;

pub use country::{Coordinates, Country, Currency, FlagImages};
pub use error::{DataFetchError, ExplorerError, FetchFailure, FetchOperation, Result};
pub use region::Region;
