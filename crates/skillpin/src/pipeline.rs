//! Install, upgrade and uninstall, tying resolution, the public-repository
//! gate, the executor and the manifest together.
//!
//! Every operation returns a closed outcome type. Auth walls come back as
//! values so the caller can prompt for credentials and retry.

use std::path::PathBuf;

use skillpin_agents::{AgentKind, AgentLocator, InstallScope};

use crate::access::{self, Access, AuthWall, granted};
use crate::credentials::{EnvTokenProvider, TokenProvider};
use crate::discovery;
use crate::fetch::GitHubClient;
use crate::install::{install_skill_files, remove_skill_dir};
use crate::manifest::{InstalledSkill, JsonFileStore, Manifest, ManifestStore, RepoConfig};
use crate::metadata::fetch_skills;
use crate::remote::{GitHub, Visibility};
use crate::resolve::{Resolution, SkillSource, resolve};
use crate::settings::Settings;
use crate::source::InstallSource;
use crate::types::{DiscoveryResult, RepoId, SkillMetadata, validate_skill_name};
use crate::update::{self, UpdateStatus, repo_config_for};
use crate::{Error, Result};

/// Resolves the directory an agent reads skills from.
pub trait AgentPaths {
    /// Base directory for `agent` (or the agent-neutral location) at `scope`.
    fn skills_dir(&self, agent: Option<&str>, scope: InstallScope) -> Result<PathBuf>;
}

impl AgentPaths for AgentLocator {
    fn skills_dir(&self, agent: Option<&str>, scope: InstallScope) -> Result<PathBuf> {
        let kind = agent.map(str::parse::<AgentKind>).transpose()?;
        Ok(AgentLocator::skills_dir(self, kind, scope)?)
    }
}

/// Asks the user before installing from a public repository.
pub trait Confirm {
    /// Returns `true` to proceed with installing `skill` from `repo`.
    fn confirm_public(&self, repo: &RepoId, skill: &str) -> bool;
}

impl<F: Fn(&RepoId, &str) -> bool> Confirm for F {
    fn confirm_public(&self, repo: &RepoId, skill: &str) -> bool {
        self(repo, skill)
    }
}

/// Options for [`Pipeline::install`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Where to install.
    pub scope: InstallScope,
    /// Agent id whose directory to install into; `None` for `.skills/`.
    pub agent: Option<String>,
    /// Skip the public-repository confirmation.
    pub force: bool,
}

/// Install progress, reported in phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallProgress {
    /// Locating the skill.
    Resolving,
    /// Writing files.
    Downloading {
        /// Files written so far.
        written: usize,
        /// Files to write.
        total: usize,
    },
    /// Recording the install.
    Finalizing,
    /// Installed and recorded.
    Done,
}

impl InstallProgress {
    /// Overall completion: resolving is 0-25%, downloading 25-75%,
    /// finalizing 75-100%, and 100% once done.
    #[must_use]
    pub fn percent(&self) -> u8 {
        match *self {
            Self::Resolving => 0,
            Self::Downloading { written, total } => {
                let done = if total == 0 { 1.0 } else { written as f64 / total as f64 };
                (25.0 + 50.0 * done.min(1.0)).round() as u8
            }
            Self::Finalizing => 75,
            Self::Done => 100,
        }
    }
}

/// Outcome of [`Pipeline::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Files written and recorded.
    Installed {
        /// The manifest entry.
        skill: InstalledSkill,
        /// Number of files written.
        files: usize,
    },
    /// Nothing matched.
    NotFound {
        /// What was searched for.
        query: String,
    },
    /// The name matched in several places.
    Conflict {
        /// Every match.
        sources: Vec<SkillSource>,
    },
    /// The user declined the public-repository confirmation.
    Cancelled,
    /// The remote requires credentials.
    AuthRequired(AuthWall),
}

impl From<AuthWall> for InstallOutcome {
    fn from(wall: AuthWall) -> Self {
        Self::AuthRequired(wall)
    }
}

/// Outcome of [`Pipeline::upgrade`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// Reinstalled at the branch head.
    Upgraded {
        /// The updated manifest entry.
        skill: InstalledSkill,
        /// Commit the skill was at before.
        previous_sha: String,
    },
    /// Already at the branch head.
    UpToDate,
    /// The remote requires credentials.
    AuthRequired(AuthWall),
}

impl From<AuthWall> for UpgradeOutcome {
    fn from(wall: AuthWall) -> Self {
        Self::AuthRequired(wall)
    }
}

/// Outcome of [`Pipeline::uninstall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// Directory and manifest entry removed.
    Removed(InstalledSkill),
    /// No skill by that name.
    NotInstalled {
        /// The requested name.
        name: String,
    },
}

/// Result of [`Pipeline::upgrade_all`]: what worked and what did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeReport {
    /// Skills moved to a new commit.
    pub upgraded: Vec<String>,
    /// Skills already current.
    pub up_to_date: Vec<String>,
    /// Skills that could not be upgraded, with the reason.
    pub failed: Vec<(String, String)>,
}

/// The skill pipeline over injected collaborators.
#[derive(Debug)]
pub struct Pipeline<G, S, P, T> {
    github: G,
    manifest: Manifest<S>,
    paths: P,
    tokens: T,
    concurrency: usize,
}

impl Pipeline<GitHubClient, JsonFileStore, AgentLocator, EnvTokenProvider> {
    /// A pipeline talking to GitHub, persisting to the configured manifest
    /// file, installing relative to the current directory and reading tokens
    /// from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the manifest or
    /// current directory cannot be located.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            GitHubClient::new(settings)?,
            JsonFileStore::new(settings.manifest_path()?),
            AgentLocator::from_current_dir()?,
            EnvTokenProvider,
        )
        .with_concurrency(settings.max_concurrency))
    }
}

impl<G, S, P, T> Pipeline<G, S, P, T>
where
    G: GitHub,
    S: ManifestStore,
    P: AgentPaths,
    T: TokenProvider,
{
    /// Assembles a pipeline.
    pub fn new(github: G, store: S, paths: P, tokens: T) -> Self {
        Self {
            github,
            manifest: Manifest::new(store),
            paths,
            tokens,
            concurrency: Settings::default().max_concurrency,
        }
    }

    /// Caps concurrent `SKILL.md` fetches.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The manifest, for repository configuration and queries.
    pub fn manifest(&self) -> &Manifest<S> {
        &self.manifest
    }

    /// Resolves `input` and installs the matching skill.
    ///
    /// `input` is a skill name to search for in the configured repositories
    /// or a GitHub URL. A first-time install from a public repository asks
    /// `confirm` unless [`InstallOptions::force`] is set; a repository
    /// counts as seen only when the installed skill of that name came from
    /// the same repository and path. Installing a name that is already
    /// present replaces its files and manifest entry, and removes the old
    /// directory if the new one is elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnmanagedDirectory`] if the target directory exists
    /// but is not the recorded location of the installed skill.
    pub fn install(
        &self,
        input: &str,
        options: &InstallOptions,
        confirm: &impl Confirm,
        mut on_progress: impl FnMut(InstallProgress),
    ) -> Result<InstallOutcome> {
        on_progress(InstallProgress::Resolving);
        let token = self.token();
        let token = token.as_deref();
        let manifest = self.manifest.load()?;

        let source = InstallSource::parse(input);
        let resolution = resolve(&self.github, token, &source, &manifest.repos, self.concurrency)?;
        let resolved = match resolution {
            Resolution::Resolved(resolved) => resolved,
            Resolution::NotFound { query } => return Ok(InstallOutcome::NotFound { query }),
            Resolution::Conflict { sources } => return Ok(InstallOutcome::Conflict { sources }),
            Resolution::AuthRequired(wall) => return Ok(wall.into()),
        };
        let meta = resolved.metadata;
        let repo = resolved.repo;
        validate_skill_name(&meta.name)?;

        let repo_name = repo.to_string();
        let existing = manifest.find_installed(&meta.name);
        let same_source =
            existing.is_some_and(|s| s.repo == repo_name && s.repo_path == meta.path);
        if !same_source && !options.force {
            let visibility = granted!(access::gate(self.github.visibility(&repo, token))?);
            if visibility == Visibility::Public && !confirm.confirm_public(&repo, &meta.name) {
                tracing::info!(%repo, skill = %meta.name, "install cancelled");
                return Ok(InstallOutcome::Cancelled);
            }
        }

        // Pin to a commit so the recorded SHA matches the files written.
        let sha = granted!(access::gate(
            self.github.branch_sha(&repo, &resolved.branch, token)
        )?);
        let target = self
            .paths
            .skills_dir(options.agent.as_deref(), options.scope)?
            .join(&meta.name);
        let previous = existing.map(|s| s.installed_path.clone());
        if previous.as_ref() == Some(&target) {
            remove_skill_dir(&target)?;
        } else if target.exists() {
            return Err(Error::UnmanagedDirectory(target));
        }

        let files = granted!(install_skill_files(
            &self.github,
            token,
            &repo,
            &meta.path,
            &sha,
            &target,
            |written, total| on_progress(InstallProgress::Downloading { written, total }),
        )?);

        on_progress(InstallProgress::Finalizing);
        if let Some(old) = previous.filter(|old| *old != target) {
            remove_skill_dir(&old)?;
        }
        let configured = manifest.find_repo(&repo_name).is_some();
        let skill = InstalledSkill {
            name: meta.name,
            repo: repo_name,
            repo_path: meta.path,
            commit_sha: sha,
            version: meta.version,
            kind: meta.kind,
            installed_path: target,
            scope: options.scope,
            agent: options.agent.clone(),
            branch: (!configured).then_some(resolved.branch),
        };
        self.manifest.add_installed_skill(skill.clone())?;
        tracing::info!(
            skill = %skill.name,
            %repo,
            sha = %skill.commit_sha,
            files,
            path = %skill.installed_path.display(),
            "installed skill"
        );
        on_progress(InstallProgress::Done);

        Ok(InstallOutcome::Installed { skill, files })
    }

    /// Moves an installed skill to the head of its branch.
    ///
    /// The old directory is removed before the new files are written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInstalled`] if no skill has this name.
    pub fn upgrade(
        &self,
        name: &str,
        mut on_progress: impl FnMut(InstallProgress),
    ) -> Result<UpgradeOutcome> {
        on_progress(InstallProgress::Resolving);
        let token = self.token();
        let token = token.as_deref();
        let manifest = self.manifest.load()?;
        let skill = manifest
            .find_installed(name)
            .ok_or_else(|| Error::NotInstalled(name.to_string()))?;
        let config = repo_config_for(&manifest, skill);

        let status = granted!(update::check_update(&self.github, token, skill, &config)?);
        let UpdateStatus::Available {
            latest_sha,
            latest_version,
        } = status
        else {
            return Ok(UpgradeOutcome::UpToDate);
        };

        remove_skill_dir(&skill.installed_path)?;
        granted!(install_skill_files(
            &self.github,
            token,
            &config.repo_id()?,
            &skill.repo_path,
            &latest_sha,
            &skill.installed_path,
            |written, total| on_progress(InstallProgress::Downloading { written, total }),
        )?);

        on_progress(InstallProgress::Finalizing);
        let upgraded = InstalledSkill {
            commit_sha: latest_sha,
            version: latest_version,
            ..skill.clone()
        };
        self.manifest.add_installed_skill(upgraded.clone())?;
        tracing::info!(
            skill = name,
            from = %skill.commit_sha,
            to = %upgraded.commit_sha,
            "upgraded skill"
        );
        on_progress(InstallProgress::Done);

        Ok(UpgradeOutcome::Upgraded {
            skill: upgraded,
            previous_sha: skill.commit_sha.clone(),
        })
    }

    /// Upgrades every installed skill, continuing past failures.
    pub fn upgrade_all(&self) -> Result<UpgradeReport> {
        let mut report = UpgradeReport::default();
        for skill in self.manifest.installed()? {
            match self.upgrade(&skill.name, |_| {}) {
                Ok(UpgradeOutcome::Upgraded { .. }) => report.upgraded.push(skill.name),
                Ok(UpgradeOutcome::UpToDate) => report.up_to_date.push(skill.name),
                Ok(UpgradeOutcome::AuthRequired(wall)) => {
                    report.failed.push((skill.name, wall.message));
                }
                Err(e) => {
                    tracing::warn!(skill = %skill.name, error = %e, "upgrade failed");
                    report.failed.push((skill.name, e.to_string()));
                }
            }
        }
        Ok(report)
    }

    /// Removes an installed skill's directory, then its manifest entry.
    pub fn uninstall(&self, name: &str) -> Result<UninstallOutcome> {
        let Some(skill) = self.manifest.find_installed(name)? else {
            return Ok(UninstallOutcome::NotInstalled {
                name: name.to_string(),
            });
        };
        remove_skill_dir(&skill.installed_path)?;
        self.manifest.remove_installed_skill(name)?;
        tracing::info!(
            skill = name,
            path = %skill.installed_path.display(),
            "uninstalled skill"
        );
        Ok(UninstallOutcome::Removed(skill))
    }

    /// Checks every installed skill for updates; failures are per skill.
    pub fn check_updates(&self) -> Result<Vec<(String, Result<Access<UpdateStatus>>)>> {
        let token = self.token();
        let manifest = self.manifest.load()?;
        Ok(update::check_all(&self.github, token.as_deref(), &manifest))
    }

    /// Scans `repo` for skill collection roots.
    ///
    /// Uses the configured branch when `branch` is `None` and the repository
    /// is configured, else `main`.
    pub fn discover(
        &self,
        repo: &str,
        branch: Option<&str>,
    ) -> Result<Access<DiscoveryResult>> {
        let id = RepoId::parse(repo)?;
        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => self.config_for(&id)?.branch,
        };
        let token = self.token();
        discovery::discover(&self.github, &id, &branch, token.as_deref())
    }

    /// Lists the skills offered by `repo`, configured or not.
    pub fn available_skills(&self, repo: &str) -> Result<Access<Vec<SkillMetadata>>> {
        let config = self.config_for(&RepoId::parse(repo)?)?;
        let token = self.token();
        fetch_skills(&self.github, token.as_deref(), &config, self.concurrency)
    }

    /// The configured token; blank counts as anonymous.
    fn token(&self) -> Option<String> {
        self.tokens.token().filter(|t| !t.trim().is_empty())
    }

    fn config_for(&self, repo: &RepoId) -> Result<RepoConfig> {
        let name = repo.to_string();
        Ok(self
            .manifest
            .find_repo(&name)?
            .unwrap_or_else(|| RepoConfig::new(name, "main", Vec::new())))
    }
}
