//! Repository scanning for skill collection roots.

use crate::access::{self, Access, granted};
use crate::remote::GitHub;
use crate::types::{DiscoveryResult, RepoId, SKILL_FILE, SkillPath};
use crate::Result;

/// Path reported for skills that sit directly at the repository root.
pub const ROOT_PATH: &str = "/";

/// Scans `repo` at `branch` with a single recursive tree call.
///
/// An anonymous 404 is reported as a possibly private repository; with a
/// token it is a hard [`Error::NotFound`](crate::Error::NotFound).
pub fn discover<G: GitHub + ?Sized>(
    gh: &G,
    repo: &RepoId,
    branch: &str,
    token: Option<&str>,
) -> Result<Access<DiscoveryResult>> {
    let tree = granted!(access::gate_private(gh.tree(repo, branch, token), repo, token)?);
    if tree.truncated {
        tracing::warn!(%repo, branch, "repository tree truncated; discovery may be incomplete");
    }

    let skill_files: Vec<&str> = tree
        .tree
        .iter()
        .filter(|e| e.is_blob() && is_skill_file(&e.path))
        .map(|e| e.path.as_str())
        .collect();
    let skill_paths = extract_parent_paths(&skill_files);
    let total_skills = skill_paths.iter().map(|p| p.skill_count).sum();
    tracing::debug!(%repo, total_skills, roots = skill_paths.len(), "discovered skills");

    Ok(Access::Granted(DiscoveryResult {
        skill_paths,
        total_skills,
        truncated: tree.truncated,
    }))
}

/// Groups `SKILL.md` paths by the first segment of their parent directory.
///
/// `skills/pdf/SKILL.md` and `skills/commit/SKILL.md` both count toward
/// `skills/`, while `pdf/SKILL.md` is its own root `pdf/`. Results are
/// sorted by descending count; ties keep first-seen order.
///
/// # Examples
///
/// ```
/// use skillpin::extract_parent_paths;
///
/// let paths = extract_parent_paths(&[
///     "skills/pdf/SKILL.md",
///     "tools/lint/SKILL.md",
///     "skills/commit/SKILL.md",
/// ]);
/// assert_eq!(paths[0].path, "skills/");
/// assert_eq!(paths[0].skill_count, 2);
/// assert_eq!(paths[1].path, "tools/");
/// ```
#[must_use]
pub fn extract_parent_paths(files: &[&str]) -> Vec<SkillPath> {
    let mut groups: Vec<SkillPath> = Vec::new();
    for file in files {
        let parent = file.rsplit_once('/').map_or("", |(dir, _)| dir);
        let root = match parent.split('/').next() {
            Some(first) if !first.is_empty() => format!("{first}/"),
            _ => ROOT_PATH.to_string(),
        };
        match groups.iter_mut().find(|g| g.path == root) {
            Some(group) => group.skill_count += 1,
            None => groups.push(SkillPath {
                path: root,
                skill_count: 1,
            }),
        }
    }
    groups.sort_by(|a, b| b.skill_count.cmp(&a.skill_count));
    groups
}

fn is_skill_file(path: &str) -> bool {
    path == SKILL_FILE || path.ends_with(&format!("/{SKILL_FILE}"))
}
