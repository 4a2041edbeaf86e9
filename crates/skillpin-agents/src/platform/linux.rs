//! Linux base directories with XDG support.

use std::path::PathBuf;

use crate::error::Result;

/// Returns the user's config directory on Linux.
///
/// `XDG_CONFIG_HOME` wins when it is set to a non-empty absolute path;
/// otherwise `~/.config/`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        Some(path) if path.is_absolute() => Ok(path),
        _ => Ok(super::home_dir()?.join(".config")),
    }
}
