//! Concurrent `SKILL.md` retrieval for configured repositories.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::access::{self, Access, AuthWall, granted};
use crate::frontmatter::parse_frontmatter;
use crate::manifest::RepoConfig;
use crate::remote::{EntryKind, GitHub};
use crate::types::{RepoId, SKILL_FILE, SkillMetadata, join_repo_path, last_segment};
use crate::{Error, Result};

/// Outcome of probing one candidate directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The directory holds a named skill.
    Found(SkillMetadata),
    /// No `SKILL.md`, or one without a usable name.
    Absent {
        /// Probed directory.
        path: String,
    },
    /// The fetch failed for a reason other than a missing file.
    FetchError {
        /// Probed directory.
        path: String,
        /// Failure description.
        message: String,
    },
    /// The remote refused the request.
    Denied {
        /// Probed directory.
        path: String,
        /// The refusal.
        wall: AuthWall,
    },
}

/// Fetches metadata for every skill directory in `config`.
///
/// Each configured path (or the root, when none are configured) is listed
/// and every sub-directory's `SKILL.md` is fetched through at most
/// `concurrency` worker threads. Directories without a readable, named
/// `SKILL.md` are skipped. Result order is unspecified.
///
/// An auth wall while listing, or while fetching any single `SKILL.md`,
/// aborts the scan with [`Access::AuthRequired`].
pub fn fetch_skills<G: GitHub + ?Sized>(
    gh: &G,
    token: Option<&str>,
    config: &RepoConfig,
    concurrency: usize,
) -> Result<Access<Vec<SkillMetadata>>> {
    let repo = config.repo_id()?;
    let mut skills = Vec::new();

    for base in search_roots(config) {
        let listing = gh.list_dir(&repo, base, &config.branch, token);
        let entries = match listing {
            Err(Error::NotFound(_)) if token.is_some() => {
                tracing::warn!(%repo, path = base, "configured path not found; skipping");
                continue;
            }
            other => granted!(access::gate_private(other, &repo, token)?),
        };

        let dirs: Vec<String> = entries
            .into_iter()
            .filter(|e| e.kind == EntryKind::Dir)
            .map(|e| e.path)
            .collect();

        for probe in probe_directories(gh, &repo, &config.branch, &dirs, token, concurrency) {
            match probe {
                Probe::Found(meta) => skills.push(meta),
                Probe::Absent { path } => {
                    tracing::debug!(%repo, path, "no skill manifest; skipping");
                }
                Probe::FetchError { path, message } => {
                    tracing::warn!(
                        %repo,
                        path,
                        error = %message,
                        "failed to fetch skill manifest; skipping"
                    );
                }
                Probe::Denied { path, wall } => {
                    tracing::debug!(%repo, path, "skill manifest fetch refused");
                    return Ok(wall.into());
                }
            }
        }
    }

    Ok(Access::Granted(skills))
}

/// Fetches and parses the `SKILL.md` of a single directory.
///
/// Returns `Ok(Access::Granted(None))` when the file is missing or has no
/// usable name.
pub fn fetch_skill<G: GitHub + ?Sized>(
    gh: &G,
    repo: &RepoId,
    git_ref: &str,
    dir: &str,
    token: Option<&str>,
) -> Result<Access<Option<SkillMetadata>>> {
    let file = join_repo_path(dir, SKILL_FILE);
    match gh.raw_file(repo, git_ref, &file, token) {
        Ok(bytes) => Ok(Access::Granted(parse_skill(&bytes, repo, dir))),
        Err(Error::NotFound(_)) => Ok(Access::Granted(None)),
        Err(e) => access::gate(Err(e)),
    }
}

/// Probes each directory's `SKILL.md` concurrently.
///
/// At most `concurrency` scoped threads pull from a shared index; all are
/// joined before returning. Output order follows the input.
pub fn probe_directories<G: GitHub + ?Sized>(
    gh: &G,
    repo: &RepoId,
    git_ref: &str,
    dirs: &[String],
    token: Option<&str>,
    concurrency: usize,
) -> Vec<Probe> {
    let workers = concurrency.max(1).min(dirs.len());
    if workers == 0 {
        return Vec::new();
    }

    let next = AtomicUsize::new(0);
    let next = &next;
    let mut indexed: Vec<(usize, Probe)> = thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                s.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let i = next.fetch_add(1, Ordering::Relaxed);
                        let Some(dir) = dirs.get(i) else { break };
                        done.push((i, probe(gh, repo, git_ref, dir, token)));
                    }
                    done
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    indexed.sort_by_key(|(i, _)| *i);
    indexed.into_iter().map(|(_, p)| p).collect()
}

fn probe<G: GitHub + ?Sized>(
    gh: &G,
    repo: &RepoId,
    git_ref: &str,
    dir: &str,
    token: Option<&str>,
) -> Probe {
    let path = dir.to_string();
    match fetch_skill(gh, repo, git_ref, dir, token) {
        Ok(Access::Granted(Some(meta))) => Probe::Found(meta),
        Ok(Access::Granted(None)) => Probe::Absent { path },
        Ok(Access::AuthRequired(wall)) => Probe::Denied { path, wall },
        Err(e) => Probe::FetchError {
            path,
            message: e.to_string(),
        },
    }
}

fn parse_skill(bytes: &[u8], repo: &RepoId, dir: &str) -> Option<SkillMetadata> {
    let text = String::from_utf8_lossy(bytes);
    let fm = parse_frontmatter(&text);
    let dir = dir.trim_matches('/');
    SkillMetadata::from_frontmatter(&fm, last_segment(dir), repo, dir)
}

fn search_roots(config: &RepoConfig) -> Vec<&str> {
    if config.paths.is_empty() {
        vec![""]
    } else {
        config.paths.iter().map(|p| p.trim_matches('/')).collect()
    }
}
