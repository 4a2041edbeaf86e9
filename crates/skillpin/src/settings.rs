//! Runtime settings with environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use crate::Result;

/// Overrides the GitHub REST API base URL.
pub const API_URL_ENV: &str = "SKILLPIN_API_URL";
/// Overrides the raw content base URL.
pub const RAW_URL_ENV: &str = "SKILLPIN_RAW_URL";
/// Overrides the per-request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "SKILLPIN_TIMEOUT_SECS";
/// Overrides the metadata fetch concurrency.
pub const CONCURRENCY_ENV: &str = "SKILLPIN_CONCURRENCY";
/// Overrides the manifest location.
pub const MANIFEST_ENV: &str = "SKILLPIN_MANIFEST";

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONCURRENCY: usize = 8;

/// Settings shared by the HTTP client and the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// GitHub REST API base URL.
    pub api_url: String,
    /// Raw content base URL.
    pub raw_url: String,
    /// Global timeout applied to every request.
    pub timeout: Duration,
    /// Upper bound on concurrent `SKILL.md` fetches.
    pub max_concurrency: usize,
    /// Manifest location; `None` means the per-user default.
    pub manifest_path: Option<PathBuf>,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            raw_url: DEFAULT_RAW_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_CONCURRENCY,
            manifest_path: None,
            user_agent: concat!("skillpin/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Settings {
    /// Defaults overridden by `SKILLPIN_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns.
    ///
    /// Unparsable or empty values are ignored with a warning.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get(API_URL_ENV) {
            settings.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get(RAW_URL_ENV) {
            settings.raw_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = get(TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => settings.timeout = Duration::from_secs(secs),
                _ => tracing::warn!(key = TIMEOUT_ENV, value = %raw, "ignoring invalid timeout"),
            }
        }
        if let Some(raw) = get(CONCURRENCY_ENV) {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => settings.max_concurrency = n,
                _ => tracing::warn!(
                    key = CONCURRENCY_ENV,
                    value = %raw,
                    "ignoring invalid concurrency"
                ),
            }
        }
        if let Some(path) = get(MANIFEST_ENV) {
            settings.manifest_path = Some(PathBuf::from(path));
        }
        settings
    }

    /// Manifest location: the override, else `<config_dir>/skillpin/manifest.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn manifest_path(&self) -> Result<PathBuf> {
        match &self.manifest_path {
            Some(path) => Ok(path.clone()),
            None => Ok(skillpin_agents::platform::config_dir()?
                .join("skillpin")
                .join("manifest.json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.api_url, "https://api.github.com");
        assert_eq!(s.raw_url, "https://raw.githubusercontent.com");
        assert_eq!(s.timeout, Duration::from_secs(10));
        assert_eq!(s.max_concurrency, 8);
        assert!(s.user_agent.starts_with("skillpin/"));
    }

    #[test]
    fn overrides_apply() {
        let s = Settings::from_lookup(lookup(&[
            (API_URL_ENV, "http://localhost:9000/"),
            (RAW_URL_ENV, "http://localhost:9001"),
            (TIMEOUT_ENV, "3"),
            (CONCURRENCY_ENV, "2"),
            (MANIFEST_ENV, "/tmp/m.json"),
        ]));
        assert_eq!(s.api_url, "http://localhost:9000");
        assert_eq!(s.raw_url, "http://localhost:9001");
        assert_eq!(s.timeout, Duration::from_secs(3));
        assert_eq!(s.max_concurrency, 2);
        assert_eq!(s.manifest_path().unwrap(), PathBuf::from("/tmp/m.json"));
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let s = Settings::from_lookup(lookup(&[
            (TIMEOUT_ENV, "soon"),
            (CONCURRENCY_ENV, "0"),
            (API_URL_ENV, "  "),
        ]));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn default_manifest_path_is_under_config_dir() {
        let path = Settings::default().manifest_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("skillpin/manifest.json"));
    }
}
