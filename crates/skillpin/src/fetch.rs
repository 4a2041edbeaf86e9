//! Blocking GitHub client over `ureq`.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::access::{self, RATE_LIMIT_REMAINING};
use crate::remote::{DirEntry, GitHub, Tree, Visibility};
use crate::settings::Settings;
use crate::types::RepoId;
use crate::{Error, Result};

/// Per-file download cap.
pub const SIZE_LIMIT: u64 = 50 * 1024 * 1024;

/// [`GitHub`] implementation talking to the REST API and raw content host.
///
/// Every request carries the configured global timeout. Non-success
/// statuses are classified through [`access::classify`]; nothing is retried.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: Url,
    raw_url: Url,
    user_agent: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
}

#[derive(Deserialize)]
struct RepoResponse {
    private: bool,
}

impl GitHubClient {
    /// Builds a client from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if a configured base URL does not parse.
    pub fn new(settings: &Settings) -> Result<Self> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(settings.timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Ok(Self {
            agent,
            api_url: parse_base(&settings.api_url)?,
            raw_url: parse_base(&settings.raw_url)?,
            user_agent: settings.user_agent.clone(),
        })
    }

    fn api(&self, segments: &[&str]) -> Url {
        with_segments(&self.api_url, segments)
    }

    fn get_bytes(&self, url: &Url, repo: &RepoId, token: Option<&str>) -> Result<Vec<u8>> {
        tracing::debug!(%url, authenticated = token.is_some(), "GET");

        let mut request = self.agent.get(url.as_str()).header("User-Agent", &self.user_agent);
        for (name, value) in access::request_headers(token) {
            request = request.header(name, value);
        }

        let mut response = request.call().map_err(|e| match e {
            ureq::Error::Io(io_err) => Error::Http(format!("transport error: {io_err}")),
            _ => Error::Http(format!("request failed: {e}")),
        })?;

        let status = response.status().as_u16();
        let remaining = response
            .headers()
            .get(RATE_LIMIT_REMAINING)
            .and_then(|v| v.to_str().ok());
        let class = access::classify(status, remaining);
        if let Some(err) = access::status_error(class, repo, token.is_some(), url.as_str()) {
            tracing::debug!(%url, status, ?class, "request refused");
            return Err(err);
        }

        if let Some(len) = response.headers().get("content-length")
            && let Ok(size) = len.to_str().unwrap_or("").parse::<u64>()
            && size > SIZE_LIMIT
        {
            return Err(Error::SizeLimit {
                size,
                limit: SIZE_LIMIT,
            });
        }

        response
            .body_mut()
            .with_config()
            .limit(SIZE_LIMIT)
            .read_to_vec()
            .map_err(|e| Error::Http(format!("read error: {e}")))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        repo: &RepoId,
        token: Option<&str>,
    ) -> Result<T> {
        let bytes = self.get_bytes(url, repo, token)?;
        serde_json::from_slice(&bytes).map_err(Error::from)
    }
}

impl GitHub for GitHubClient {
    fn list_dir(
        &self,
        repo: &RepoId,
        path: &str,
        branch: &str,
        token: Option<&str>,
    ) -> Result<Vec<DirEntry>> {
        let mut segments: Vec<&str> =
            vec!["repos", repo.owner.as_str(), repo.name.as_str(), "contents"];
        segments.extend(split_path(path));
        let mut url = self.api(&segments);
        url.query_pairs_mut().append_pair("ref", branch);
        self.get_json(&url, repo, token)
    }

    fn tree(&self, repo: &RepoId, git_ref: &str, token: Option<&str>) -> Result<Tree> {
        let mut url = self.api(&[
            "repos",
            repo.owner.as_str(),
            repo.name.as_str(),
            "git",
            "trees",
            git_ref,
        ]);
        url.query_pairs_mut().append_pair("recursive", "1");
        self.get_json(&url, repo, token)
    }

    fn raw_file(
        &self,
        repo: &RepoId,
        git_ref: &str,
        path: &str,
        token: Option<&str>,
    ) -> Result<Vec<u8>> {
        let mut segments: Vec<&str> = vec![repo.owner.as_str(), repo.name.as_str()];
        segments.extend(split_path(git_ref));
        segments.extend(split_path(path));
        let url = with_segments(&self.raw_url, &segments);
        self.get_bytes(&url, repo, token)
    }

    fn branch_sha(&self, repo: &RepoId, branch: &str, token: Option<&str>) -> Result<String> {
        let url = self.api(&["repos", repo.owner.as_str(), repo.name.as_str(), "commits", branch]);
        let commit: CommitResponse = self.get_json(&url, repo, token)?;
        Ok(commit.sha)
    }

    fn visibility(&self, repo: &RepoId, token: Option<&str>) -> Result<Visibility> {
        let url = self.api(&["repos", repo.owner.as_str(), repo.name.as_str()]);
        let info: RepoResponse = self.get_json(&url, repo, token)?;
        Ok(if info.private {
            Visibility::Private
        } else {
            Visibility::Public
        })
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn with_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
