//! Local display-name session.
//!
//! There is no authentication: logging in only records a display name so the
//! UI can greet the user and decide which screen to open first.

use crate::domain::error::{ExplorerError, Result};
use crate::storage::{PersistentStore, SessionRecord};

/// First screen to show on start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landing {
    Login,
    Catalog(SessionRecord),
}

#[derive(Debug, Clone)]
pub struct SessionController {
    store: PersistentStore,
}

impl SessionController {
    #[must_use]
    pub const fn new(store: PersistentStore) -> Self {
        Self { store }
    }

    /// Records a session for `display_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidInput`] if the name is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use country_explorer::app::SessionController;
    /// use country_explorer::storage::{MemoryBackend, PersistentStore};
    ///
    /// let session = SessionController::new(PersistentStore::new(MemoryBackend::new()));
    /// let record = session.login("  Ada ")?;
    /// assert_eq!(record.display_name, "Ada");
    /// assert!(session.login("   ").is_err());
    /// # Ok::<(), country_explorer::ExplorerError>(())
    /// ```
    pub fn login(&self, display_name: &str) -> Result<SessionRecord> {
        let name = display_name.trim();
        if name.is_empty() {
            return Err(ExplorerError::InvalidInput("display name must not be empty".to_string()));
        }
        let record = SessionRecord::new(name);
        self.store.save_session(&record);
        tracing::debug!(display_name = %name, "logged in");
        Ok(record)
    }

    pub fn logout(&self) {
        self.store.clear_session();
        tracing::debug!("logged out");
    }

    #[must_use]
    pub fn current(&self) -> Option<SessionRecord> {
        self.store.load_session()
    }

    /// Catalog if a session is stored, login otherwise.
    #[must_use]
    pub fn landing(&self) -> Landing {
        self.current().map_or(Landing::Login, Landing::Catalog)
    }
}
