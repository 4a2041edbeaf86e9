//! GitHub access layer: request headers, response classification and
//! the auth-wall values that higher layers pass through unchanged.

use std::fmt;

use crate::types::RepoId;
use crate::{Error, Result};

/// Versioned media type sent with every API request.
pub const ACCEPT: &str = "application/vnd.github+json";

/// REST API version pinned through `X-GitHub-Api-Version`.
pub const API_VERSION: &str = "2022-11-28";

/// Header carrying the remaining request quota.
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Builds the header set for a request, with or without a bearer token.
pub fn request_headers(token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut headers = vec![
        ("Accept", ACCEPT.to_string()),
        ("X-GitHub-Api-Version", API_VERSION.to_string()),
    ];
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        headers.push(("Authorization", format!("Bearer {token}")));
    }
    headers
}

/// Classification of an HTTP response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx.
    Ok,
    /// Quota exhausted; authenticating raises the limit.
    RateLimited,
    /// Credentials missing or insufficient.
    AuthRequired,
    /// 404.
    NotFound,
    /// Any other non-success status.
    Failed(u16),
}

/// Classifies a status code. `rate_limit_remaining` is the value of the
/// `x-ratelimit-remaining` header, if any.
///
/// A 403 is only a rate limit when the quota header reads `0`; otherwise it
/// is an access denial. GitHub's secondary limits answer with 429.
#[must_use]
pub fn classify(status: u16, rate_limit_remaining: Option<&str>) -> StatusClass {
    match status {
        200..=299 => StatusClass::Ok,
        401 => StatusClass::AuthRequired,
        403 if rate_limit_remaining.is_some_and(|r| r.trim() == "0") => StatusClass::RateLimited,
        403 => StatusClass::AuthRequired,
        429 => StatusClass::RateLimited,
        404 => StatusClass::NotFound,
        other => StatusClass::Failed(other),
    }
}

/// Converts a non-success classification into the matching [`Error`].
///
/// Returns `None` for [`StatusClass::Ok`].
#[must_use]
pub fn status_error(
    class: StatusClass,
    repo: &RepoId,
    has_token: bool,
    url: &str,
) -> Option<Error> {
    match class {
        StatusClass::Ok => None,
        StatusClass::RateLimited => {
            Some(Error::AuthRequired(AuthWall::rate_limited(has_token)))
        }
        StatusClass::AuthRequired => {
            Some(Error::AuthRequired(AuthWall::unauthorized(repo, has_token)))
        }
        StatusClass::NotFound => Some(Error::NotFound(url.to_string())),
        StatusClass::Failed(status) => Some(Error::Status {
            status,
            url: url.to_string(),
        }),
    }
}

/// Why the remote refused to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallKind {
    /// 401, or 403 without a rate-limit signal.
    Unauthorized,
    /// Request quota exhausted.
    RateLimited,
    /// 404 without credentials: the repository may exist but be private.
    PossiblyPrivate,
}

/// A recoverable refusal from the remote, carrying user-facing guidance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthWall {
    /// Classification of the refusal.
    pub kind: WallKind,
    /// Human-readable explanation with the suggested remedy.
    pub message: String,
}

impl AuthWall {
    /// Access denied to `repo`.
    #[must_use]
    pub fn unauthorized(repo: &RepoId, has_token: bool) -> Self {
        let message = if has_token {
            format!(
                "Access to {repo} was denied. Your GitHub token may have expired \
                 or lack access to this repository."
            )
        } else {
            format!("Authentication required to access {repo}. Sign in to GitHub and try again.")
        };
        Self {
            kind: WallKind::Unauthorized,
            message,
        }
    }

    /// GitHub API quota exhausted.
    #[must_use]
    pub fn rate_limited(has_token: bool) -> Self {
        let message = if has_token {
            "GitHub API rate limit exceeded. Wait for the limit to reset and try again.".to_string()
        } else {
            "GitHub API rate limit exceeded. Sign in to GitHub for a higher rate limit.".to_string()
        };
        Self {
            kind: WallKind::RateLimited,
            message,
        }
    }

    /// `repo` could not be found anonymously; it may be private.
    #[must_use]
    pub fn possibly_private(repo: &RepoId) -> Self {
        Self {
            kind: WallKind::PossiblyPrivate,
            message: format!(
                "Repository {repo} was not found. If it is private, sign in to GitHub to access it."
            ),
        }
    }
}

impl fmt::Display for AuthWall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of a remote operation that may hit an auth wall.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Access<T> {
    /// The operation completed.
    Granted(T),
    /// The remote requires (better) credentials.
    AuthRequired(AuthWall),
}

impl<T> Access<T> {
    /// Maps the granted value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Access<U> {
        match self {
            Self::Granted(value) => Access::Granted(f(value)),
            Self::AuthRequired(wall) => Access::AuthRequired(wall),
        }
    }

    /// Returns the granted value, if any.
    pub fn granted(self) -> Option<T> {
        match self {
            Self::Granted(value) => Some(value),
            Self::AuthRequired(_) => None,
        }
    }

    /// Returns `true` if the operation completed.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

impl<T> From<AuthWall> for Access<T> {
    fn from(wall: AuthWall) -> Self {
        Self::AuthRequired(wall)
    }
}

/// Turns an auth-wall error into an [`Access::AuthRequired`] value.
pub fn gate<T>(result: Result<T>) -> Result<Access<T>> {
    match result {
        Ok(value) => Ok(Access::Granted(value)),
        Err(Error::AuthRequired(wall)) => Ok(Access::AuthRequired(wall)),
        Err(e) => Err(e),
    }
}

/// Like [`gate`], but also treats an anonymous 404 as a possible private repository.
///
/// GitHub answers 404 for private repositories when no credentials are sent,
/// so without a token "missing" and "hidden" cannot be told apart. With a
/// token the 404 is a real not-found and stays an error.
pub fn gate_private<T>(result: Result<T>, repo: &RepoId, token: Option<&str>) -> Result<Access<T>> {
    match result {
        Err(Error::NotFound(_)) if token.is_none() => {
            Ok(Access::AuthRequired(AuthWall::possibly_private(repo)))
        }
        other => gate(other),
    }
}

/// Unwraps an [`Access::Granted`] value or returns the wall from the
/// enclosing function, converted with `From<AuthWall>`.
macro_rules! granted {
    ($access:expr) => {
        match $access {
            $crate::access::Access::Granted(value) => value,
            $crate::access::Access::AuthRequired(wall) => return Ok(wall.into()),
        }
    };
}

pub(crate) use granted;
