//! Application layer: controllers and the event dispatcher.
//!
//! Controllers own the client-side state and are the only code that talks to
//! the gateway and the persistent store:
//!
//! ```text
//! UI → Event → handle_event → QueryController ──▶ CountryDataGateway
//!                            ├ FavoritesController ─▶ PersistentStore
//!                            ├ SessionController ──▶ PersistentStore
//!                            └ DetailController ───▶ CountryDataGateway
//! ```
//!
//! # Modules
//!
//! - [`query`]: Catalog search, region filter, and load state machine
//! - [`pagination`]: Fixed-size page arithmetic
//! - [`favorites`]: Persisted favorite codes
//! - [`session`]: Local display-name session
//! - [`detail`]: Single-country detail loading
//! - [`handler`]: UI event routing

pub mod detail;
pub mod favorites;
pub mod handler;
pub mod pagination;
pub mod query;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use detail::{CountryDetail, DetailController};
pub use favorites::FavoritesController;
pub use handler::{handle_event, Event};
pub use query::{ListingPhase, QueryController, QuerySpec, QueryStatus, ViewError, ViewState};
pub use session::{Landing, SessionController};
