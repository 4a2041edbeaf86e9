//! Core type definitions for skill resolution.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::frontmatter::{FieldValue, Frontmatter};
use crate::{Error, Result};

/// File name that marks a directory as a skill.
pub const SKILL_FILE: &str = "SKILL.md";

const MAX_SKILL_NAME_LEN: usize = 64;

static SKILL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("skill name pattern is valid")
});

/// A GitHub repository coordinate, `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoId {
    /// Account or organization.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoId {
    /// Creates a repository id without validation.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parses `owner/name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepo`] unless the input has exactly two
    /// non-empty segments.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim().trim_end_matches('/');
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(Error::InvalidRepo(s.to_string())),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Metadata read from a skill's `SKILL.md` frontmatter.
///
/// Recomputed on every search and never persisted directly; see
/// [`InstalledSkill`](crate::InstalledSkill) for the persisted projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMetadata {
    /// Skill name; the directory name when the frontmatter has none.
    pub name: String,

    /// Free-form description, empty when absent.
    #[serde(default)]
    pub description: String,

    /// Informational version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Skill type as declared by the author.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Author name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Tags for search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Owning repository as `owner/name`.
    pub repo: String,

    /// Directory of the skill inside the repository.
    pub path: String,
}

impl SkillMetadata {
    /// Projects a parsed frontmatter record onto skill metadata.
    ///
    /// `dir_name` is used when the record has no `name`. Returns `None` when
    /// neither yields a non-empty name.
    #[must_use]
    pub fn from_frontmatter(
        fm: &Frontmatter,
        dir_name: &str,
        repo: &RepoId,
        path: &str,
    ) -> Option<Self> {
        let text = |key: &str| {
            fm.get(key)
                .and_then(FieldValue::as_text)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let name = text("name").or_else(|| Some(dir_name.to_string()).filter(|s| !s.is_empty()))?;
        let tags = fm.get("tags").map(|v| match v {
            FieldValue::List(items) => items.clone(),
            FieldValue::Text(s) => vec![s.clone()],
        });

        Some(Self {
            name,
            description: text("description").unwrap_or_default(),
            version: text("version"),
            kind: text("type"),
            author: text("author"),
            tags,
            repo: repo.to_string(),
            path: path.to_string(),
        })
    }

    /// Last segment of [`path`](Self::path), the name search matches on.
    #[must_use]
    pub fn dir_name(&self) -> &str {
        last_segment(&self.path)
    }
}

/// A candidate collection root found by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPath {
    /// Top-level directory with a trailing `/`, or `/` for the repository root.
    pub path: String,
    /// Number of skills found beneath it.
    pub skill_count: usize,
}

/// Result of scanning a repository tree for skills.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    /// Candidate roots, most skills first.
    pub skill_paths: Vec<SkillPath>,
    /// Sum of all skill counts.
    pub total_skills: usize,
    /// The remote truncated the tree; results may be incomplete.
    pub truncated: bool,
}

/// Checks that `name` is usable as a skill directory name.
///
/// # Errors
///
/// Returns [`Error::InvalidSkillName`] for names that are empty, too long,
/// or contain characters outside `[A-Za-z0-9._-]`.
pub fn validate_skill_name(name: &str) -> Result<()> {
    if name.len() > MAX_SKILL_NAME_LEN || !SKILL_NAME.is_match(name) {
        return Err(Error::InvalidSkillName(name.to_string()));
    }
    Ok(())
}

pub(crate) fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

/// Joins a repository directory and a file name, treating `""` as the root.
pub(crate) fn join_repo_path(dir: &str, file: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::parse_frontmatter;

    fn repo() -> RepoId {
        RepoId::new("acme", "skills")
    }

    #[test]
    fn repo_id_parse() {
        let id = RepoId::parse("acme/skills").unwrap();
        assert_eq!(id.owner, "acme");
        assert_eq!(id.name, "skills");
        assert_eq!(id.to_string(), "acme/skills");
        assert_eq!("acme/skills/".parse::<RepoId>().unwrap(), id);
    }

    #[test]
    fn repo_id_rejects_malformed() {
        for bad in ["", "acme", "/skills", "acme/", "a/b/c"] {
            assert!(
                matches!(RepoId::parse(bad), Err(Error::InvalidRepo(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn metadata_from_full_frontmatter() {
        let fm = parse_frontmatter(concat!(
            "---\nname: pdf\ndescription: PDF tools\nversion: 1.2\n",
            "type: tool\nauthor: Ann\ntags: [docs, pdf]\n---\n",
        ));
        let meta =
            SkillMetadata::from_frontmatter(&fm, "pdf-dir", &repo(), "skills/pdf-dir").unwrap();
        assert_eq!(meta.name, "pdf");
        assert_eq!(meta.description, "PDF tools");
        assert_eq!(meta.version.as_deref(), Some("1.2"));
        assert_eq!(meta.kind.as_deref(), Some("tool"));
        assert_eq!(meta.author.as_deref(), Some("Ann"));
        assert_eq!(meta.tags, Some(vec!["docs".into(), "pdf".into()]));
        assert_eq!(meta.repo, "acme/skills");
        assert_eq!(meta.dir_name(), "pdf-dir");
    }

    #[test]
    fn metadata_name_falls_back_to_directory() {
        let fm = parse_frontmatter("no frontmatter here");
        let meta =
            SkillMetadata::from_frontmatter(&fm, "commit", &repo(), "skills/commit").unwrap();
        assert_eq!(meta.name, "commit");
        assert_eq!(meta.description, "");
        assert!(meta.version.is_none());
        assert!(meta.tags.is_none());
    }

    #[test]
    fn metadata_without_any_name_is_none() {
        let fm = parse_frontmatter("");
        assert!(SkillMetadata::from_frontmatter(&fm, "", &repo(), "").is_none());
    }

    #[test]
    fn metadata_serializes_kind_as_type() {
        let fm = parse_frontmatter("---\nname: x\ntype: prompt\n---\n");
        let meta = SkillMetadata::from_frontmatter(&fm, "x", &repo(), "x").unwrap();
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "prompt");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn skill_name_validation() {
        for ok in ["pdf", "my-skill", "a.b_c", "X1"] {
            assert!(validate_skill_name(ok).is_ok(), "{ok}");
        }
        let too_long = "a".repeat(65);
        for bad in ["", "..", ".hidden", "a/b", "a b", "-x", too_long.as_str()] {
            assert!(validate_skill_name(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn path_helpers() {
        assert_eq!(last_segment("skills/pdf"), "pdf");
        assert_eq!(last_segment("skills/pdf/"), "pdf");
        assert_eq!(last_segment("pdf"), "pdf");
        assert_eq!(join_repo_path("", SKILL_FILE), "SKILL.md");
        assert_eq!(join_repo_path("/skills/pdf/", SKILL_FILE), "skills/pdf/SKILL.md");
    }

    #[test]
    fn discovery_result_uses_camel_case() {
        let result = DiscoveryResult {
            skill_paths: vec![SkillPath {
                path: "skills/".into(),
                skill_count: 2,
            }],
            total_skills: 2,
            truncated: false,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["skillPaths"][0]["skillCount"], 2);
        assert_eq!(json["totalSkills"], 2);
    }
}
