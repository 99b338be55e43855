//! Region filter values accepted by the country data source.

use crate::domain::error::ExplorerError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the fixed continental regions the catalog can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
}

impl Region {
    /// All regions in the order a filter menu lists them.
    pub const ALL: [Self; 5] = [
        Self::Africa,
        Self::Americas,
        Self::Asia,
        Self::Europe,
        Self::Oceania,
    ];

    /// Name as used in the `/region/{r}` path segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Africa => "Africa",
            Self::Americas => "Americas",
            Self::Asia => "Asia",
            Self::Europe => "Europe",
            Self::Oceania => "Oceania",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ExplorerError;

    /// Parses a region name case-insensitively, ignoring surrounding whitespace.
    ///
    /// ```
    /// use country_explorer::Region;
    ///
    /// assert_eq!("europe".parse::<Region>().unwrap(), Region::Europe);
    /// assert!("Antarctica".parse::<Region>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ExplorerError::InvalidInput(format!("unknown region: {wanted}")))
    }
}
