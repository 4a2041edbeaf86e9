//! Windows base directories.

use std::path::PathBuf;

use crate::error::Result;

/// Returns the user's config directory on Windows (`%APPDATA%`).
///
/// # Errors
///
/// Returns an error if `APPDATA` is not set.
pub fn config_dir() -> Result<PathBuf> {
    Ok(PathBuf::from(std::env::var("APPDATA")?))
}
