//! Error types for agent path resolution.

/// Errors that can occur while resolving agent directories.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A base directory (home, config) could not be determined.
    #[error("directory not found: {0}")]
    NotFound(String),

    /// The agent identifier is not recognised.
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// The requested scope is not supported by this agent.
    #[error("{agent} does not support {scope} scope")]
    UnsupportedScope {
        /// The agent that doesn't support the scope.
        agent: String,
        /// The scope that isn't supported (e.g., "local").
        scope: String,
    },

    /// An environment variable could not be read.
    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// The current platform is not supported.
    #[error("unsupported platform")]
    UnsupportedPlatform,

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for agent path operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_scope_display() {
        let err = Error::UnsupportedScope {
            agent: "Copilot CLI".to_string(),
            scope: "local".to_string(),
        };
        assert_eq!(err.to_string(), "Copilot CLI does not support local scope");
    }

    #[test]
    fn unknown_agent_display() {
        let err = Error::UnknownAgent("emacs".to_string());
        assert_eq!(err.to_string(), "unknown agent: emacs");
    }
}
