//! Event handling for the presentation layer.
//!
//! The UI translates user input into [`Event`]s and feeds them to
//! [`handle_event`], which routes each one to the controller that owns the
//! affected state. The returned flag tells the UI whether anything visible
//! changed.
//!
//! ```text
//! User Input → Event → handle_event → Controllers → ViewState / Store
//!                                          │
//!                                          └──▶ Gateway (spawned)
//! ```
//!
//! Query results arrive asynchronously; the UI observes them through
//! [`QueryController::subscribe`](crate::app::QueryController::subscribe)
//! rather than through this function's return value.

use crate::domain::error::Result;
use crate::domain::Region;
use crate::storage::SettingsRecord;
use crate::Explorer;

/// User intents the core reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The search box text changed.
    SearchChanged(String),
    /// A region was picked from the filter menu, or cleared.
    RegionSelected(Option<Region>),
    /// A pagination control was used.
    PageSelected(usize),
    /// Manual reload, also used for the first load.
    Refresh,
    /// The error banner was closed.
    DismissError,

    ToggleFavorite(String),
    AddFavorite(String),
    RemoveFavorite(String),

    /// The login form was submitted with this display name.
    Login(String),
    Logout,
    /// Removes session, favorites, and settings.
    ClearUserData,
    SaveSettings(SettingsRecord),
}

/// Applies `event` and returns whether the UI should re-render.
///
/// # Errors
///
/// Returns [`ExplorerError::InvalidInput`](crate::ExplorerError::InvalidInput)
/// for a login with a blank display name. All other events are infallible.
///
/// # Examples
///
/// ```no_run
/// use country_explorer::{handle_event, initialize, Config, Event};
///
/// # async fn demo() -> country_explorer::Result<()> {
/// let mut explorer = initialize(&Config::default())?;
/// handle_event(&mut explorer, &Event::Refresh)?;
/// handle_event(&mut explorer, &Event::SearchChanged("United".into()))?;
/// # Ok(())
/// # }
/// ```
pub fn handle_event(explorer: &mut Explorer, event: &Event) -> Result<bool> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::SearchChanged(text) => Ok(explorer.query.set_search_term(text)),
        Event::RegionSelected(region) => Ok(explorer.query.set_region(*region)),
        Event::PageSelected(page) => Ok(explorer.query.set_page(*page)),
        Event::Refresh => {
            explorer.query.refresh();
            Ok(true)
        }
        Event::DismissError => Ok(explorer.query.dismiss_error()),
        Event::ToggleFavorite(code) => {
            let now_favorite = explorer.favorites.toggle(code);
            tracing::debug!(code = %code, now_favorite, "favorite toggled");
            Ok(true)
        }
        Event::AddFavorite(code) => Ok(explorer.favorites.add(code)),
        Event::RemoveFavorite(code) => Ok(explorer.favorites.remove(code)),
        Event::Login(name) => {
            explorer.session.login(name)?;
            Ok(true)
        }
        Event::Logout => {
            explorer.session.logout();
            Ok(true)
        }
        Event::ClearUserData => {
            explorer.store.clear_all_user_data();
            explorer.favorites.reload();
            Ok(true)
        }
        Event::SaveSettings(settings) => {
            if explorer.store.load_settings() == *settings {
                tracing::debug!("settings unchanged, skipping save");
                return Ok(false);
            }
            explorer.store.save_settings(settings);
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::query::QueryStatus;
    use crate::app::testing::{sample_countries, FakeGateway};
    use crate::app::Landing;
    use crate::domain::error::ExplorerError;
    use crate::storage::{MemoryBackend, PersistentStore, Theme};
    use std::sync::Arc;
    use std::time::Duration;

    fn explorer() -> (PersistentStore, Explorer) {
        let store = PersistentStore::new(MemoryBackend::new());
        let gateway = Arc::new(FakeGateway::with_countries(sample_countries()));
        (store.clone(), Explorer::new(store, gateway))
    }

    #[tokio::test(start_paused = true)]
    async fn query_events_drive_the_view() {
        let (_, mut explorer) = explorer();

        assert!(handle_event(&mut explorer, &Event::RegionSelected(Some(Region::Asia))).unwrap());
        assert!(!handle_event(&mut explorer, &Event::RegionSelected(Some(Region::Asia))).unwrap());
        tokio::time::sleep(Duration::from_secs(1)).await;

        let view = explorer.query.snapshot();
        assert_eq!(view.status, QueryStatus::Loaded);
        assert_eq!(view.results.len(), 2);
        assert!(!handle_event(&mut explorer, &Event::PageSelected(2)).unwrap());
    }

    #[tokio::test]
    async fn favorite_events_persist() {
        let (store, mut explorer) = explorer();

        handle_event(&mut explorer, &Event::ToggleFavorite("USA".into())).unwrap();
        assert!(handle_event(&mut explorer, &Event::AddFavorite("JPN".into())).unwrap());
        assert!(!handle_event(&mut explorer, &Event::RemoveFavorite("GBR".into())).unwrap());
        assert_eq!(store.load_favorites(), vec!["USA".to_string(), "JPN".to_string()]);

        handle_event(&mut explorer, &Event::ClearUserData).unwrap();
        assert!(explorer.favorites.is_empty());
        assert!(store.load_favorites().is_empty());
    }

    #[tokio::test]
    async fn login_logout_and_settings() {
        let (store, mut explorer) = explorer();

        assert!(matches!(
            handle_event(&mut explorer, &Event::Login("  ".into())),
            Err(ExplorerError::InvalidInput(_))
        ));
        handle_event(&mut explorer, &Event::Login("Ada".into())).unwrap();
        assert!(matches!(explorer.session.landing(), Landing::Catalog(_)));
        handle_event(&mut explorer, &Event::Logout).unwrap();
        assert_eq!(explorer.session.landing(), Landing::Login);

        let dark = SettingsRecord {
            theme: Theme::Dark,
            ..SettingsRecord::default()
        };
        assert!(handle_event(&mut explorer, &Event::SaveSettings(dark.clone())).unwrap());
        assert!(!handle_event(&mut explorer, &Event::SaveSettings(dark.clone())).unwrap());
        assert_eq!(store.load_settings(), dark);
    }
}
