//! Path resolution helpers.

use std::path::{Path, PathBuf};

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~` are returned unchanged.
///
/// # Example
///
/// ```
/// use scentmatch_core::util::paths::expand_tilde;
///
/// let expanded = expand_tilde("~/scentmatch");
/// assert!(!expanded.starts_with("~"));
/// ```
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

/// Default directory for index artifacts: `<XDG data dir>/scentmatch`.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("scentmatch"))
}
