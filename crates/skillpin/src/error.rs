//! Error types for skill resolution and installation.

use thiserror::Error;

use crate::access::AuthWall;

/// Errors that can occur while resolving, installing or updating skills.
///
/// An [`Error::AuthRequired`] raised by the remote layer is converted into an
/// [`Access::AuthRequired`](crate::Access::AuthRequired) value by pipeline
/// operations, so callers can prompt for credentials instead of failing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// HTTP transport failed (connection, timeout, unreadable body).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The remote answered with a non-success status that has no dedicated class.
    #[error("GitHub request failed with status {status}: {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Invalid URL provided or constructed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The remote resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote demands credentials, or rate-limited the caller.
    #[error("{0}")]
    AuthRequired(AuthWall),

    /// The skill directory was located but contains no files.
    #[error("no files in skill directory {path} of {repo}")]
    EmptySkillDirectory {
        /// Repository as `owner/name`.
        repo: String,
        /// Directory inside the repository.
        path: String,
    },

    /// The repository tree was truncated by the remote, so a complete install is impossible.
    #[error("repository tree for {0} is too large and was truncated by GitHub")]
    TruncatedTree(String),

    /// A remote path would escape the skill's target directory.
    #[error("refusing to write outside the skill directory: {0}")]
    UnsafePath(String),

    /// The install target already exists and no installed skill owns it.
    #[error("refusing to replace unmanaged directory {}", .0.display())]
    UnmanagedDirectory(std::path::PathBuf),

    /// The skill name cannot be used as a directory name.
    #[error("invalid skill name: {0:?}")]
    InvalidSkillName(String),

    /// A repository reference is not of the form `owner/name`.
    #[error("invalid repository (expected owner/name): {0}")]
    InvalidRepo(String),

    /// The repository is not configured in the local manifest.
    #[error("repository is not configured: {0}")]
    UnknownRepo(String),

    /// No installed skill has this name.
    #[error("skill is not installed: {0}")]
    NotInstalled(String),

    /// Download size limit exceeded.
    #[error("size limit exceeded: {size} bytes > {limit} bytes")]
    SizeLimit {
        /// Actual size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        limit: u64,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Agent directory resolution failed.
    #[error("agent path error: {0}")]
    Agent(#[from] skillpin_agents::Error),
}

/// A specialized Result type for skill operations.
pub type Result<T> = std::result::Result<T, Error>;
