//! Error types for the country explorer core.
//!
//! Two error types live here. [`DataFetchError`] is the single error channel of
//! the country data gateway: every transport failure, non-success status, or
//! malformed payload collapses into it, tagged with the operation that was
//! attempted. [`ExplorerError`] is the crate-level error used by controllers,
//! configuration, and storage backends, with [`Result`] as its alias.
//!
//! Storage failures never reach controllers: the persistent store logs them
//! and hands back a fallback value instead. They only appear as
//! [`ExplorerError::Storage`] inside backend implementations.

use thiserror::Error;

/// Gateway operation that was attempted when a fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchOperation {
    /// Full dataset snapshot (`/all`).
    All,
    /// Partial name match (`/name/{q}`).
    ByName,
    /// Region listing (`/region/{r}`).
    ByRegion,
    /// Single code lookup (`/alpha/{code}`).
    ByCode,
    /// Batched code lookup (`/alpha?codes=`).
    ByCodes,
}

impl std::fmt::Display for FetchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::All => "fetch all",
            Self::ByName => "fetch by name",
            Self::ByRegion => "fetch by region",
            Self::ByCode => "fetch by code",
            Self::ByCodes => "fetch by codes",
        };
        f.write_str(name)
    }
}

/// Underlying cause of a failed gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-success status code.
    #[error("server returned status {0}")]
    Status(u16),

    /// The body was not a JSON array of country-shaped objects.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Failure of a single gateway call.
///
/// Always recoverable by retrying the same query. The gateway never returns
/// partial results alongside this error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {cause}")]
pub struct DataFetchError {
    /// The operation that was attempted.
    pub operation: FetchOperation,
    /// Human-readable cause.
    pub cause: FetchFailure,
}

impl DataFetchError {
    /// Creates a new fetch error for `operation`.
    #[must_use]
    pub const fn new(operation: FetchOperation, cause: FetchFailure) -> Self {
        Self { operation, cause }
    }
}

/// The main error type for country explorer operations.
///
/// # Examples
///
/// ```
/// use country_explorer::ExplorerError;
///
/// fn validate_name(name: &str) -> Result<(), ExplorerError> {
///     if name.trim().is_empty() {
///         return Err(ExplorerError::InvalidInput("display name is empty".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_name("  ").is_err());
/// ```
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// A gateway call failed.
    #[error(transparent)]
    DataFetch(#[from] DataFetchError),

    /// A storage backend could not read, write, or decode its data.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied input was rejected (empty display name, unknown region).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A code lookup succeeded but matched no country.
    #[error("Country not found: {0}")]
    CountryNotFound(String),
}

/// A specialized `Result` type for country explorer operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;
