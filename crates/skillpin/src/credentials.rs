//! Optional bearer-token sources.

/// Environment variables checked for a token, in order.
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Supplies an optional GitHub token.
///
/// Obtaining and storing credentials happens elsewhere; the pipeline only
/// asks for the current token, if any.
pub trait TokenProvider {
    /// Returns the current token, or `None` for anonymous access.
    fn token(&self) -> Option<String>;
}

/// Reads the token from `GITHUB_TOKEN`, then `GH_TOKEN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvTokenProvider;

impl TokenProvider for EnvTokenProvider {
    fn token(&self) -> Option<String> {
        TOKEN_ENV_VARS
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }
}

/// A fixed token, or none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticToken(pub Option<String>);

impl StaticToken {
    /// A provider that always returns `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// A provider that never returns a token.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

impl<F: Fn() -> Option<String>> TokenProvider for F {
    fn token(&self) -> Option<String> {
        self()
    }
}
