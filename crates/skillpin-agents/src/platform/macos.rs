//! macOS base directories.

use std::path::PathBuf;

use crate::error::Result;

/// Returns the user's config directory on macOS.
///
/// CLI agents on macOS follow XDG conventions rather than
/// `~/Library/Application Support/`, so this is `~/.config/`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf> {
    Ok(super::home_dir()?.join(".config"))
}
