//! Turning an [`InstallSource`] into exactly one skill, or a reason why not.

use crate::access::{self, Access, AuthWall, granted};
use crate::manifest::RepoConfig;
use crate::metadata::{fetch_skill, fetch_skills};
use crate::remote::GitHub;
use crate::source::InstallSource;
use crate::types::{RepoId, SkillMetadata};
use crate::Result;

/// A skill located in exactly one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSkill {
    /// Parsed metadata.
    pub metadata: SkillMetadata,
    /// Owning repository.
    pub repo: RepoId,
    /// Branch the skill was found on.
    pub branch: String,
}

/// One place a searched name was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillSource {
    /// Repository as `owner/name`.
    pub repo: String,
    /// Directory inside the repository.
    pub path: String,
}

/// Outcome of resolving an install target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one match.
    Resolved(ResolvedSkill),
    /// No match.
    NotFound {
        /// What was searched for.
        query: String,
    },
    /// Several matches; the caller must pick one with an explicit URL.
    Conflict {
        /// Every match, in configuration order.
        sources: Vec<SkillSource>,
    },
    /// The remote requires credentials.
    AuthRequired(AuthWall),
}

impl From<AuthWall> for Resolution {
    fn from(wall: AuthWall) -> Self {
        Self::AuthRequired(wall)
    }
}

/// Resolves `source` against `repos`.
///
/// A [`InstallSource::GitHubRef`] reads the skill's `SKILL.md` directly. A
/// [`InstallSource::RepoSearch`] scans every configured repository in order,
/// matching directory names case-insensitively, and stops at the first auth
/// wall without contacting the remaining repositories. More than one match
/// is always a [`Resolution::Conflict`].
pub fn resolve<G: GitHub + ?Sized>(
    gh: &G,
    token: Option<&str>,
    source: &InstallSource,
    repos: &[RepoConfig],
    concurrency: usize,
) -> Result<Resolution> {
    match source {
        InstallSource::GitHubRef {
            owner,
            repo,
            branch,
            path,
        } => resolve_ref(gh, token, &RepoId::new(owner, repo), branch, path.as_deref()),
        InstallSource::RepoSearch { name } => search(gh, token, name, repos, concurrency),
    }
}

fn resolve_ref<G: GitHub + ?Sized>(
    gh: &G,
    token: Option<&str>,
    repo: &RepoId,
    branch: &str,
    path: Option<&str>,
) -> Result<Resolution> {
    let dir = path.unwrap_or_default();
    let query = match path {
        Some(p) => format!("{repo}/{p}"),
        None => repo.to_string(),
    };

    let found = granted!(fetch_skill(gh, repo, branch, dir, token)?);
    let Some(metadata) = found else {
        // Anonymous 404s are indistinguishable from private repositories.
        if token.is_none() {
            match access::gate_private(gh.visibility(repo, token), repo, token)? {
                Access::AuthRequired(wall) => return Ok(wall.into()),
                Access::Granted(_) => {}
            }
        }
        return Ok(Resolution::NotFound { query });
    };

    Ok(Resolution::Resolved(ResolvedSkill {
        metadata,
        repo: repo.clone(),
        branch: branch.to_string(),
    }))
}

fn search<G: GitHub + ?Sized>(
    gh: &G,
    token: Option<&str>,
    name: &str,
    repos: &[RepoConfig],
    concurrency: usize,
) -> Result<Resolution> {
    let mut matches = Vec::new();

    for config in repos {
        let skills = granted!(fetch_skills(gh, token, config, concurrency)?);
        let repo = config.repo_id()?;
        matches.extend(
            skills
                .into_iter()
                .filter(|s| s.dir_name().eq_ignore_ascii_case(name))
                .map(|metadata| ResolvedSkill {
                    metadata,
                    repo: repo.clone(),
                    branch: config.branch.clone(),
                }),
        );
    }

    tracing::debug!(query = name, matches = matches.len(), "searched configured repositories");
    match matches.len() {
        0 => Ok(Resolution::NotFound {
            query: name.to_string(),
        }),
        1 => Ok(Resolution::Resolved(matches.remove(0))),
        _ => Ok(Resolution::Conflict {
            sources: matches
                .into_iter()
                .map(|m| SkillSource {
                    repo: m.metadata.repo,
                    path: m.metadata.path,
                })
                .collect(),
        }),
    }
}
