//! Platform-specific base directories.
//!
//! Skill directories and the local manifest hang off the user's home and
//! config directories, which differ per platform.

use std::path::PathBuf;

use crate::error::{Error, Result};

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub use macos::*;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::*;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use windows::*;

/// The user's home directory, from `$HOME` or the platform equivalent.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if it cannot be determined.
#[cfg(any(target_os = "macos", target_os = "linux", target_os = "windows"))]
pub fn home_dir() -> Result<PathBuf> {
    home::home_dir().ok_or_else(|| Error::NotFound("home directory".into()))
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
mod unsupported {
    use super::{Error, PathBuf, Result};

    /// Always [`Error::UnsupportedPlatform`].
    pub fn home_dir() -> Result<PathBuf> {
        Err(Error::UnsupportedPlatform)
    }

    /// Always [`Error::UnsupportedPlatform`].
    pub fn config_dir() -> Result<PathBuf> {
        Err(Error::UnsupportedPlatform)
    }
}
#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
pub use unsupported::*;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_dir_is_absolute() {
        let path = home_dir().expect("home_dir should succeed");
        assert!(path.is_absolute());
    }

    #[test]
    fn config_dir_is_absolute() {
        let _env = test_utils::EnvGuard::new();

        let path = config_dir().expect("config_dir should succeed");
        assert!(path.is_absolute());
    }
}
