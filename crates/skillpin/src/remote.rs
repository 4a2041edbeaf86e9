//! The remote repository boundary.
//!
//! Every remote call made by the pipeline goes through [`GitHub`]. Failures
//! are already classified: auth walls arrive as [`Error::AuthRequired`],
//! missing resources as [`Error::NotFound`].
//!
//! [`Error::AuthRequired`]: crate::Error::AuthRequired
//! [`Error::NotFound`]: crate::Error::NotFound

use serde::Deserialize;

use crate::Result;
use crate::types::RepoId;

/// Kind of a directory listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Symlink.
    Symlink,
    /// Git submodule.
    Submodule,
}

/// One entry of a contents listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirEntry {
    /// Entry name.
    pub name: String,
    /// Path from the repository root.
    pub path: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// Kind of a git tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    /// File contents.
    Blob,
    /// Directory.
    Tree,
    /// Submodule commit.
    Commit,
}

/// One entry of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    /// Path from the repository root.
    pub path: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: TreeKind,
}

impl TreeEntry {
    /// Returns `true` for file entries.
    #[must_use]
    pub fn is_blob(&self) -> bool {
        self.kind == TreeKind::Blob
    }
}

/// A recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tree {
    /// Tree SHA.
    #[serde(default)]
    pub sha: String,
    /// All entries, depth first.
    pub tree: Vec<TreeEntry>,
    /// The listing exceeded GitHub's limits and is incomplete.
    #[serde(default)]
    pub truncated: bool,
}

/// Repository visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Anyone can read the repository.
    Public,
    /// Reading requires credentials.
    Private,
}

/// Read access to GitHub repositories.
///
/// `token` is an optional bearer token; implementations send it when present
/// and otherwise make anonymous requests.
pub trait GitHub: Sync {
    /// Lists a directory at `branch`. An empty `path` lists the root.
    fn list_dir(
        &self,
        repo: &RepoId,
        path: &str,
        branch: &str,
        token: Option<&str>,
    ) -> Result<Vec<DirEntry>>;

    /// Lists every entry reachable from `git_ref` (branch name or commit SHA).
    fn tree(&self, repo: &RepoId, git_ref: &str, token: Option<&str>) -> Result<Tree>;

    /// Fetches the raw bytes of a file at `git_ref`.
    fn raw_file(
        &self,
        repo: &RepoId,
        git_ref: &str,
        path: &str,
        token: Option<&str>,
    ) -> Result<Vec<u8>>;

    /// Returns the current commit SHA of `branch`.
    fn branch_sha(&self, repo: &RepoId, branch: &str, token: Option<&str>) -> Result<String>;

    /// Returns whether the repository is public or private.
    fn visibility(&self, repo: &RepoId, token: Option<&str>) -> Result<Visibility>;
}

impl<T: GitHub + ?Sized> GitHub for &T {
    fn list_dir(
        &self,
        repo: &RepoId,
        path: &str,
        branch: &str,
        token: Option<&str>,
    ) -> Result<Vec<DirEntry>> {
        (**self).list_dir(repo, path, branch, token)
    }

    fn tree(&self, repo: &RepoId, git_ref: &str, token: Option<&str>) -> Result<Tree> {
        (**self).tree(repo, git_ref, token)
    }

    fn raw_file(
        &self,
        repo: &RepoId,
        git_ref: &str,
        path: &str,
        token: Option<&str>,
    ) -> Result<Vec<u8>> {
        (**self).raw_file(repo, git_ref, path, token)
    }

    fn branch_sha(&self, repo: &RepoId, branch: &str, token: Option<&str>) -> Result<String> {
        (**self).branch_sha(repo, branch, token)
    }

    fn visibility(&self, repo: &RepoId, token: Option<&str>) -> Result<Visibility> {
        (**self).visibility(repo, token)
    }
}

/// In-memory [`GitHub`] for tests, with a request log.
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::sync::Mutex;

    use super::*;
    use crate::Error;
    use crate::access::AuthWall;

    /// One repository: branch heads pointing at commits of `path -> contents`.
    #[derive(Debug, Clone, Default)]
    pub struct FakeRepo {
        pub branches: HashMap<String, String>,
        pub commits: HashMap<String, BTreeMap<String, Vec<u8>>>,
        pub private: bool,
        pub requires_auth: bool,
        pub truncated: bool,
        pub failing: BTreeSet<String>,
        pub denied: BTreeSet<String>,
    }

    impl FakeRepo {
        /// A repository with `main` at commit `sha1` holding `files`.
        pub fn with_files(files: &[(&str, &str)]) -> Self {
            let mut repo = Self::default();
            repo.commit("main", "sha1", files);
            repo
        }

        /// Points `branch` at a new commit `sha` holding exactly `files`.
        pub fn commit(&mut self, branch: &str, sha: &str, files: &[(&str, &str)]) -> &mut Self {
            let contents = files
                .iter()
                .map(|(p, c)| ((*p).to_string(), c.as_bytes().to_vec()))
                .collect();
            self.commits.insert(sha.to_string(), contents);
            self.branches.insert(branch.to_string(), sha.to_string());
            self
        }

        fn files_at(&self, git_ref: &str) -> Option<&BTreeMap<String, Vec<u8>>> {
            let sha = self.branches.get(git_ref).map_or(git_ref, String::as_str);
            self.commits.get(sha)
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeGitHub {
        repos: Mutex<HashMap<String, FakeRepo>>,
        log: Mutex<Vec<String>>,
    }

    impl FakeGitHub {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_repo(self, repo: &str, data: FakeRepo) -> Self {
            self.insert(repo, data);
            self
        }

        pub fn insert(&self, repo: &str, data: FakeRepo) {
            self.repos.lock().unwrap().insert(repo.to_string(), data);
        }

        /// Mutates a stored repository in place.
        pub fn update(&self, repo: &str, f: impl FnOnce(&mut FakeRepo)) {
            let mut repos = self.repos.lock().unwrap();
            f(repos.get_mut(repo).expect("fake repo exists"));
        }

        /// Requests made so far, as `"<op> <owner/name> <detail>"`.
        pub fn requests(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        pub fn requests_for(&self, repo: &str) -> usize {
            let needle = format!(" {repo} ");
            self.requests()
                .iter()
                .filter(|r| format!("{r} ").contains(&needle))
                .count()
        }

        fn with<T>(
            &self,
            op: &str,
            repo: &RepoId,
            detail: &str,
            token: Option<&str>,
            f: impl FnOnce(&FakeRepo) -> Result<T>,
        ) -> Result<T> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{op} {repo} {detail}"));
            let repos = self.repos.lock().unwrap();
            let key = repo.to_string();
            let Some(data) = repos.get(&key) else {
                return Err(Error::NotFound(key));
            };
            if data.requires_auth && token.is_none() {
                return Err(Error::AuthRequired(AuthWall::unauthorized(repo, false)));
            }
            if data.private && token.is_none() {
                return Err(Error::NotFound(key));
            }
            if data.denied.contains(detail) {
                return Err(Error::AuthRequired(AuthWall::unauthorized(repo, token.is_some())));
            }
            if data.failing.contains(detail) {
                return Err(Error::Http(format!("transport error: {detail}")));
            }
            f(data)
        }
    }

    impl GitHub for FakeGitHub {
        fn list_dir(
            &self,
            repo: &RepoId,
            path: &str,
            branch: &str,
            token: Option<&str>,
        ) -> Result<Vec<DirEntry>> {
            self.with("list", repo, path, token, |data| {
                let files = data
                    .files_at(branch)
                    .ok_or_else(|| Error::NotFound(branch.to_string()))?;
                let prefix = if path.is_empty() {
                    String::new()
                } else {
                    format!("{}/", path.trim_matches('/'))
                };
                let mut entries: BTreeMap<String, DirEntry> = BTreeMap::new();
                for file in files.keys() {
                    let Some(rest) = file.strip_prefix(&prefix) else {
                        continue;
                    };
                    let (name, kind) = match rest.split_once('/') {
                        Some((dir, _)) => (dir, EntryKind::Dir),
                        None => (rest, EntryKind::File),
                    };
                    entries.entry(name.to_string()).or_insert_with(|| DirEntry {
                        name: name.to_string(),
                        path: format!("{prefix}{name}"),
                        kind,
                    });
                }
                if entries.is_empty() && !prefix.is_empty() {
                    return Err(Error::NotFound(path.to_string()));
                }
                Ok(entries.into_values().collect())
            })
        }

        fn tree(&self, repo: &RepoId, git_ref: &str, token: Option<&str>) -> Result<Tree> {
            self.with("tree", repo, git_ref, token, |data| {
                let files = data
                    .files_at(git_ref)
                    .ok_or_else(|| Error::NotFound(git_ref.to_string()))?;
                let mut dirs = BTreeSet::new();
                for file in files.keys() {
                    let mut parts: Vec<&str> = file.split('/').collect();
                    parts.pop();
                    for i in 1..=parts.len() {
                        dirs.insert(parts[..i].join("/"));
                    }
                }
                let mut tree: Vec<TreeEntry> = dirs
                    .into_iter()
                    .map(|path| TreeEntry {
                        path,
                        kind: TreeKind::Tree,
                    })
                    .collect();
                tree.extend(files.keys().map(|path| TreeEntry {
                    path: path.clone(),
                    kind: TreeKind::Blob,
                }));
                Ok(Tree {
                    sha: git_ref.to_string(),
                    tree,
                    truncated: data.truncated,
                })
            })
        }

        fn raw_file(
            &self,
            repo: &RepoId,
            git_ref: &str,
            path: &str,
            token: Option<&str>,
        ) -> Result<Vec<u8>> {
            self.with("raw", repo, path, token, |data| {
                data.files_at(git_ref)
                    .and_then(|files| files.get(path))
                    .cloned()
                    .ok_or_else(|| Error::NotFound(path.to_string()))
            })
        }

        fn branch_sha(&self, repo: &RepoId, branch: &str, token: Option<&str>) -> Result<String> {
            self.with("sha", repo, branch, token, |data| {
                data.branches
                    .get(branch)
                    .cloned()
                    .ok_or_else(|| Error::NotFound(branch.to_string()))
            })
        }

        fn visibility(&self, repo: &RepoId, token: Option<&str>) -> Result<Visibility> {
            self.with("visibility", repo, "", token, |data| {
                Ok(if data.private {
                    Visibility::Private
                } else {
                    Visibility::Public
                })
            })
        }
    }

    #[test]
    fn fake_lists_and_trees() {
        let gh = FakeGitHub::new().with_repo(
            "acme/skills",
            FakeRepo::with_files(&[("skills/pdf/SKILL.md", "x"), ("README.md", "y")]),
        );
        let repo = RepoId::new("acme", "skills");

        let root = gh.list_dir(&repo, "", "main", None).unwrap();
        let names: Vec<_> = root.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            names,
            vec![("README.md", EntryKind::File), ("skills", EntryKind::Dir)]
        );

        let tree = gh.tree(&repo, "main", None).unwrap();
        assert!(tree.tree.iter().any(|e| e.path == "skills/pdf" && !e.is_blob()));
        assert!(
            tree.tree
                .iter()
                .any(|e| e.path == "skills/pdf/SKILL.md" && e.is_blob())
        );
        assert_eq!(gh.requests_for("acme/skills"), 2);
    }
}
