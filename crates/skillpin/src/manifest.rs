//! The local manifest: configured repositories and installed skills.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use skillpin_agents::InstallScope;

use crate::types::RepoId;
use crate::{Error, Result};

fn default_branch() -> String {
    "main".to_string()
}

/// A configured remote source of skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Repository as `owner/name`.
    pub repo: String,
    /// Branch to search and install from.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Top-level directories to search; empty means the repository root.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl RepoConfig {
    /// Creates a repository configuration.
    #[must_use]
    pub fn new(repo: impl Into<String>, branch: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: branch.into(),
            paths,
        }
    }

    /// Parses [`repo`](Self::repo).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepo`] if it is not `owner/name`.
    pub fn repo_id(&self) -> Result<RepoId> {
        RepoId::parse(&self.repo)
    }
}

/// A skill materialized on disk, pinned to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledSkill {
    /// Skill name, unique within the manifest.
    pub name: String,
    /// Source repository as `owner/name`.
    pub repo: String,
    /// Directory of the skill inside the repository; empty for the root.
    pub repo_path: String,
    /// Commit the installed files were taken from.
    pub commit_sha: String,
    /// Informational version from the skill's frontmatter.
    #[serde(default)]
    pub version: Option<String>,
    /// Skill type from the frontmatter.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Absolute path of the installed directory.
    pub installed_path: PathBuf,
    /// Installation scope.
    pub scope: InstallScope,
    /// Agent the skill was installed for, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Branch tracked for updates when the repository is not configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// The persisted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalManifest {
    /// Repository used when none is given; always one of `repos`.
    #[serde(default)]
    pub default_repo: Option<String>,
    /// Configured repositories, unique by `repo`.
    #[serde(default)]
    pub repos: Vec<RepoConfig>,
    /// Installed skills, unique by `name`.
    #[serde(default)]
    pub installed: Vec<InstalledSkill>,
}

impl LocalManifest {
    /// Inserts or replaces the configuration for `config.repo`.
    pub fn add_repo(&mut self, config: RepoConfig) {
        match self.repos.iter_mut().find(|r| r.repo == config.repo) {
            Some(existing) => *existing = config,
            None => self.repos.push(config),
        }
    }

    /// Removes a repository, clearing the default if it pointed there.
    ///
    /// Returns `true` if the repository was configured.
    pub fn remove_repo(&mut self, repo: &str) -> bool {
        let before = self.repos.len();
        self.repos.retain(|r| r.repo != repo);
        if self.default_repo.as_deref() == Some(repo) {
            self.default_repo = None;
        }
        self.repos.len() != before
    }

    /// Sets the default repository.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRepo`] if `repo` is not configured.
    pub fn set_default_repo(&mut self, repo: &str) -> Result<()> {
        if self.find_repo(repo).is_none() {
            return Err(Error::UnknownRepo(repo.to_string()));
        }
        self.default_repo = Some(repo.to_string());
        Ok(())
    }

    /// Inserts or replaces the entry for `skill.name`.
    pub fn add_installed_skill(&mut self, skill: InstalledSkill) {
        match self.installed.iter_mut().find(|s| s.name == skill.name) {
            Some(existing) => *existing = skill,
            None => self.installed.push(skill),
        }
    }

    /// Removes and returns the entry for `name`.
    pub fn remove_installed_skill(&mut self, name: &str) -> Option<InstalledSkill> {
        let idx = self.installed.iter().position(|s| s.name == name)?;
        Some(self.installed.remove(idx))
    }

    /// Looks up a configured repository.
    #[must_use]
    pub fn find_repo(&self, repo: &str) -> Option<&RepoConfig> {
        self.repos.iter().find(|r| r.repo == repo)
    }

    /// Looks up an installed skill.
    #[must_use]
    pub fn find_installed(&self, name: &str) -> Option<&InstalledSkill> {
        self.installed.iter().find(|s| s.name == name)
    }
}

/// Durable storage for a [`LocalManifest`].
pub trait ManifestStore {
    /// Reads the current document; a missing document is the default.
    fn load(&self) -> Result<LocalManifest>;

    /// Replaces the stored document.
    fn save(&self, manifest: &LocalManifest) -> Result<()>;
}

/// Pretty-printed JSON file, written via temp file + rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// A store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManifestStore for JsonFileStore {
    fn load(&self) -> Result<LocalManifest> {
        if !self.path.exists() {
            return Ok(LocalManifest::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, manifest: &LocalManifest) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(manifest)?;
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    manifest: Mutex<LocalManifest>,
}

impl MemoryStore {
    /// A store holding `manifest`.
    #[must_use]
    pub fn new(manifest: LocalManifest) -> Self {
        Self {
            manifest: Mutex::new(manifest),
        }
    }
}

impl ManifestStore for MemoryStore {
    fn load(&self) -> Result<LocalManifest> {
        Ok(self
            .manifest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn save(&self, manifest: &LocalManifest) -> Result<()> {
        *self.manifest.lock().unwrap_or_else(|e| e.into_inner()) = manifest.clone();
        Ok(())
    }
}

impl<S: ManifestStore + ?Sized> ManifestStore for &S {
    fn load(&self) -> Result<LocalManifest> {
        (**self).load()
    }

    fn save(&self, manifest: &LocalManifest) -> Result<()> {
        (**self).save(manifest)
    }
}

/// Manifest operations over a store. Every mutation reads the current
/// document, applies the change and writes it back.
#[derive(Debug)]
pub struct Manifest<S> {
    store: S,
}

impl<S: ManifestStore> Manifest<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the whole document.
    pub fn load(&self) -> Result<LocalManifest> {
        self.store.load()
    }

    fn update<T>(&self, f: impl FnOnce(&mut LocalManifest) -> Result<T>) -> Result<T> {
        let mut manifest = self.store.load()?;
        let out = f(&mut manifest)?;
        self.store.save(&manifest)?;
        Ok(out)
    }

    /// Adds or replaces a repository configuration.
    pub fn add_repo(&self, config: RepoConfig) -> Result<()> {
        config.repo_id()?;
        self.update(|m| {
            m.add_repo(config);
            Ok(())
        })
    }

    /// Removes a repository; see [`LocalManifest::remove_repo`].
    pub fn remove_repo(&self, repo: &str) -> Result<bool> {
        self.update(|m| Ok(m.remove_repo(repo)))
    }

    /// Sets the default repository; see [`LocalManifest::set_default_repo`].
    pub fn set_default_repo(&self, repo: &str) -> Result<()> {
        self.update(|m| m.set_default_repo(repo))
    }

    /// Records an installed skill, replacing any entry with the same name.
    pub fn add_installed_skill(&self, skill: InstalledSkill) -> Result<()> {
        self.update(|m| {
            m.add_installed_skill(skill);
            Ok(())
        })
    }

    /// Forgets an installed skill.
    pub fn remove_installed_skill(&self, name: &str) -> Result<Option<InstalledSkill>> {
        self.update(|m| Ok(m.remove_installed_skill(name)))
    }

    pub fn installed(&self) -> Result<Vec<InstalledSkill>> {
        Ok(self.store.load()?.installed)
    }

    pub fn repos(&self) -> Result<Vec<RepoConfig>> {
        Ok(self.store.load()?.repos)
    }

    pub fn default_repo(&self) -> Result<Option<String>> {
        Ok(self.store.load()?.default_repo)
    }

    pub fn find_installed(&self, name: &str) -> Result<Option<InstalledSkill>> {
        Ok(self.store.load()?.find_installed(name).cloned())
    }

    pub fn find_repo(&self, repo: &str) -> Result<Option<RepoConfig>> {
        Ok(self.store.load()?.find_repo(repo).cloned())
    }
}
