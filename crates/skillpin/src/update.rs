//! Commit-based update detection.

use crate::access::{self, Access, granted};
use crate::manifest::{InstalledSkill, LocalManifest, RepoConfig};
use crate::metadata::fetch_skill;
use crate::remote::GitHub;
use crate::Result;

/// Whether an installed skill is behind its branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Installed at the branch head.
    UpToDate,
    /// The branch moved.
    Available {
        /// Current head of the branch.
        latest_sha: String,
        /// Version declared at the new head, else the recorded one.
        latest_version: Option<String>,
    },
}

impl UpdateStatus {
    /// Returns `true` if an update is available.
    #[must_use]
    pub fn has_update(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// Compares the branch head of `config` with the SHA `skill` was installed at.
pub fn check_update<G: GitHub + ?Sized>(
    gh: &G,
    token: Option<&str>,
    skill: &InstalledSkill,
    config: &RepoConfig,
) -> Result<Access<UpdateStatus>> {
    let repo = config.repo_id()?;
    let latest_sha = granted!(access::gate(gh.branch_sha(&repo, &config.branch, token))?);
    if latest_sha == skill.commit_sha {
        return Ok(Access::Granted(UpdateStatus::UpToDate));
    }

    let latest_version = match fetch_skill(gh, &repo, &latest_sha, &skill.repo_path, token) {
        Ok(Access::Granted(Some(meta))) => meta.version.or_else(|| skill.version.clone()),
        Ok(Access::Granted(None)) => skill.version.clone(),
        Ok(Access::AuthRequired(wall)) => return Ok(wall.into()),
        Err(e) => {
            tracing::debug!(skill = %skill.name, error = %e, "could not read new version");
            skill.version.clone()
        }
    };

    tracing::debug!(
        skill = %skill.name,
        from = %skill.commit_sha,
        to = %latest_sha,
        "update available"
    );
    Ok(Access::Granted(UpdateStatus::Available {
        latest_sha,
        latest_version,
    }))
}

/// Checks every installed skill independently.
///
/// A failure for one skill is reported in its own slot and does not stop
/// the others.
pub fn check_all<G: GitHub + ?Sized>(
    gh: &G,
    token: Option<&str>,
    manifest: &LocalManifest,
) -> Vec<(String, Result<Access<UpdateStatus>>)> {
    manifest
        .installed
        .iter()
        .map(|skill| {
            let status = check_update(gh, token, skill, &repo_config_for(manifest, skill));
            (skill.name.clone(), status)
        })
        .collect()
}

/// The repository configuration tracked by `skill`.
///
/// Skills installed from a repository that is not configured track the
/// branch recorded at install time.
#[must_use]
pub fn repo_config_for(manifest: &LocalManifest, skill: &InstalledSkill) -> RepoConfig {
    match manifest.find_repo(&skill.repo) {
        Some(config) => config.clone(),
        None => RepoConfig::new(
            skill.repo.clone(),
            skill.branch.clone().unwrap_or_else(|| "main".to_string()),
            Vec::new(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use skillpin_agents::InstallScope;

    use super::*;
    use crate::Error;
    use crate::remote::fake::{FakeGitHub, FakeRepo};

    fn installed(sha: &str) -> InstalledSkill {
        InstalledSkill {
            name: "pdf".into(),
            repo: "acme/skills".into(),
            repo_path: "skills/pdf".into(),
            commit_sha: sha.into(),
            version: Some("1.0".into()),
            kind: None,
            installed_path: PathBuf::from("/p/.skills/pdf"),
            scope: InstallScope::Local,
            agent: None,
            branch: None,
        }
    }

    fn config() -> RepoConfig {
        RepoConfig::new("acme/skills", "main", Vec::new())
    }

    fn gh() -> FakeGitHub {
        FakeGitHub::new().with_repo(
            "acme/skills",
            FakeRepo::with_files(&[("skills/pdf/SKILL.md", "---\nname: pdf\nversion: 1.0\n---\n")]),
        )
    }

    #[test]
    fn same_sha_is_up_to_date() {
        let status = check_update(&gh(), None, &installed("sha1"), &config()).unwrap();
        assert_eq!(status, Access::Granted(UpdateStatus::UpToDate));
    }

    #[test]
    fn moved_branch_reports_new_sha_and_version() {
        let gh = gh();
        gh.update("acme/skills", |r| {
            r.commit(
                "main",
                "sha2",
                &[("skills/pdf/SKILL.md", "---\nname: pdf\nversion: 2.0\n---\n")],
            );
        });
        let status = check_update(&gh, None, &installed("sha1"), &config())
            .unwrap()
            .granted()
            .unwrap();
        assert_eq!(
            status,
            UpdateStatus::Available {
                latest_sha: "sha2".into(),
                latest_version: Some("2.0".into()),
            }
        );
        assert!(status.has_update());
    }

    #[test]
    fn unreadable_manifest_keeps_recorded_version() {
        let gh = gh();
        gh.update("acme/skills", |r| {
            r.commit("main", "sha2", &[("skills/pdf/SKILL.md", "---\nname: pdf\n---\n")]);
            r.failing.insert("skills/pdf/SKILL.md".into());
        });
        let status = check_update(&gh, None, &installed("sha1"), &config())
            .unwrap()
            .granted()
            .unwrap();
        assert_eq!(
            status,
            UpdateStatus::Available {
                latest_sha: "sha2".into(),
                latest_version: Some("1.0".into()),
            }
        );
    }

    #[test]
    fn auth_wall_is_returned() {
        let gh = gh();
        gh.update("acme/skills", |r| r.requires_auth = true);
        let status = check_update(&gh, None, &installed("sha1"), &config()).unwrap();
        assert!(!status.is_granted());
    }

    #[test]
    fn check_all_isolates_failures() {
        let gh = gh();
        let mut manifest = LocalManifest::default();
        manifest.add_repo(config());
        manifest.add_installed_skill(installed("sha1"));
        manifest.add_installed_skill(InstalledSkill {
            name: "ghost".into(),
            repo: "acme/gone".into(),
            ..installed("old")
        });

        let results = check_all(&gh, Some("token"), &manifest);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "pdf");
        assert_eq!(
            *results[0].1.as_ref().unwrap(),
            Access::Granted(UpdateStatus::UpToDate)
        );
        assert_eq!(results[1].0, "ghost");
        assert!(matches!(results[1].1, Err(Error::NotFound(_))));
    }

    #[test]
    fn unconfigured_repo_tracks_recorded_branch() {
        let manifest = LocalManifest::default();
        let skill = InstalledSkill {
            branch: Some("dev".into()),
            ..installed("sha1")
        };
        let cfg = repo_config_for(&manifest, &skill);
        assert_eq!(cfg.repo, "acme/skills");
        assert_eq!(cfg.branch, "dev");

        let cfg = repo_config_for(&manifest, &installed("sha1"));
        assert_eq!(cfg.branch, "main");
    }
}
