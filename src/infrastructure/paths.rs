//! Path utilities for the collector's working state.
//!
//! The collector keeps everything under a single data directory: the bearer
//! token file and the trace archive. This module resolves those locations and
//! expands `~` in configured paths.

use std::path::{Path, PathBuf};

/// File name of the persisted bearer token, relative to the data directory.
pub const TOKEN_FILE: &str = ".token";

/// Directory holding the trace archive, relative to the data directory.
pub const TRACES_DIR: &str = "traces";

/// Returns the location of the bearer token file.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tracelog::infrastructure::token_path;
///
/// assert_eq!(token_path(Path::new("/srv/tracelog")), Path::new("/srv/tracelog/.token"));
/// ```
#[must_use]
pub fn token_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TOKEN_FILE)
}

/// Returns the root of the trace archive.
///
/// Each function gets its own subdirectory below this root.
#[must_use]
pub fn traces_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(TRACES_DIR)
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading tilde, or any path when `HOME` is unset, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use tracelog::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path"), "/absolute/path");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    let Ok(home) = std::env::var("HOME") else {
        return path.to_string();
    };

    if path.starts_with("~/") {
        path.replacen('~', &home, 1)
    } else if path == "~" {
        home
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_files_live_under_data_dir() {
        let data_dir = Path::new("/var/lib/tracelog");
        assert_eq!(token_path(data_dir), PathBuf::from("/var/lib/tracelog/.token"));
        assert_eq!(traces_dir(data_dir), PathBuf::from("/var/lib/tracelog/traces"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Ok(home) = std::env::var("HOME") else {
            return;
        };
        assert_eq!(expand_tilde("~/traces"), format!("{home}/traces"));
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("relative/dir"), "relative/dir");
    }
}
