//! Interpretation of user-supplied install targets.

use crate::types::{RepoId, SKILL_FILE};

const DEFAULT_BRANCH: &str = "main";

const GITHUB_PREFIXES: &[&str] = &[
    "https://github.com/",
    "http://github.com/",
    "https://www.github.com/",
    "github.com/",
];

/// What the user asked to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSource {
    /// Search every configured repository for a skill directory with this name.
    RepoSearch {
        /// Directory name to match, case-insensitively.
        name: String,
    },
    /// An explicit repository coordinate.
    GitHubRef {
        /// Repository owner.
        owner: String,
        /// Repository name.
        repo: String,
        /// Branch, `main` unless given.
        branch: String,
        /// Skill directory; `None` is the repository root.
        path: Option<String>,
    },
}

impl InstallSource {
    /// Classifies `input`. Never fails: anything that is not a usable GitHub
    /// URL is treated as a name to search for.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillpin::InstallSource;
    ///
    /// assert_eq!(
    ///     InstallSource::parse("https://github.com/acme/skills/tree/dev/tools/pdf"),
    ///     InstallSource::GitHubRef {
    ///         owner: "acme".into(),
    ///         repo: "skills".into(),
    ///         branch: "dev".into(),
    ///         path: Some("tools/pdf".into()),
    ///     }
    /// );
    /// assert_eq!(
    ///     InstallSource::parse("pdf"),
    ///     InstallSource::RepoSearch { name: "pdf".into() }
    /// );
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let search = || Self::RepoSearch {
            name: input.to_string(),
        };

        let Some(rest) = GITHUB_PREFIXES
            .iter()
            .find_map(|prefix| strip_prefix_ignore_case(input, prefix))
        else {
            return search();
        };

        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        let parts: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() < 2 {
            return search();
        }

        let owner = parts[0];
        let repo = parts[1].strip_suffix(".git").unwrap_or(parts[1]);
        if repo.is_empty() {
            return search();
        }

        let (branch, path) = match parts.get(2) {
            Some(&"tree" | &"blob") if parts.len() >= 4 => {
                let mut path: Vec<&str> = parts[4..].to_vec();
                if path.last() == Some(&SKILL_FILE) {
                    path.pop();
                }
                let path = (!path.is_empty()).then(|| path.join("/"));
                (parts[3].to_string(), path)
            }
            _ => (DEFAULT_BRANCH.to_string(), None),
        };

        Self::GitHubRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch,
            path,
        }
    }

    /// Repository of a [`GitHubRef`](Self::GitHubRef), `None` for a search.
    #[must_use]
    pub fn repo_id(&self) -> Option<RepoId> {
        match self {
            Self::RepoSearch { .. } => None,
            Self::GitHubRef { owner, repo, .. } => Some(RepoId::new(owner, repo)),
        }
    }
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &input[prefix.len()..])
}
