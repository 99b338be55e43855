//! Filesystem locations.

use std::path::PathBuf;

/// Directory name used under the platform data directory.
pub const APP_DIR_NAME: &str = "country-explorer";

/// Default directory for storage and trace files.
///
/// Uses the platform's local data directory (for example
/// `~/.local/share/country-explorer` on Linux). Falls back to
/// `./.country-explorer` when the platform reports none.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(format!(".{APP_DIR_NAME}")),
        |dir| dir.join(APP_DIR_NAME),
    )
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, and all paths when no home directory is
/// known, are returned unchanged. `~user` forms are not expanded.
///
/// # Examples
///
/// ```
/// use country_explorer::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/var/lib/explorer"), PathBuf::from("/var/lib/explorer"));
/// if let Some(home) = dirs::home_dir() {
///     assert_eq!(expand_tilde("~/explorer"), home.join("explorer"));
/// }
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path {
        "~" => "",
        _ => match path.strip_prefix("~/") {
            Some(rest) => rest,
            None => return PathBuf::from(path),
        },
    };
    dirs::home_dir().map_or_else(|| PathBuf::from(path), |home| home.join(rest))
}
