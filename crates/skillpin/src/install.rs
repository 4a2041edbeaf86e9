//! Materializing skill directories on disk.

use std::path::{Component, Path, PathBuf};

use crate::access::{self, Access, granted};
use crate::remote::GitHub;
use crate::types::RepoId;
use crate::{Error, Result};

/// Writes every file under `path` at `git_ref` into `target_dir`.
///
/// An empty `path` installs the whole repository. Files are fetched and
/// written one at a time, calling `on_progress(written, total)` after each.
/// A failure part way through leaves the files written so far in place.
///
/// Returns the number of files written.
///
/// # Errors
///
/// Returns [`Error::EmptySkillDirectory`] when nothing lies under `path`,
/// [`Error::TruncatedTree`] when the listing is incomplete, and
/// [`Error::UnsafePath`] for entries that would escape `target_dir`.
pub fn install_skill_files<G: GitHub + ?Sized>(
    gh: &G,
    token: Option<&str>,
    repo: &RepoId,
    path: &str,
    git_ref: &str,
    target_dir: &Path,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<Access<usize>> {
    let tree = granted!(access::gate(gh.tree(repo, git_ref, token))?);
    if tree.truncated {
        return Err(Error::TruncatedTree(repo.to_string()));
    }

    let base = path.trim_matches('/');
    let prefix = if base.is_empty() {
        String::new()
    } else {
        format!("{base}/")
    };

    let files: Vec<(&str, PathBuf)> = tree
        .tree
        .iter()
        .filter(|e| e.is_blob())
        .filter_map(|e| {
            let rel = e.path.strip_prefix(&prefix)?;
            (!rel.is_empty()).then_some((e.path.as_str(), rel))
        })
        .map(|(full, rel)| safe_relative(rel).map(|rel| (full, rel)))
        .collect::<Result<_>>()?;

    if files.is_empty() {
        return Err(Error::EmptySkillDirectory {
            repo: repo.to_string(),
            path: base.to_string(),
        });
    }

    let total = files.len();
    std::fs::create_dir_all(target_dir)?;
    for (written, (remote_path, rel)) in files.into_iter().enumerate() {
        let bytes = granted!(access::gate(gh.raw_file(repo, git_ref, remote_path, token))?);
        let dest = target_dir.join(&rel);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, bytes)?;
        on_progress(written + 1, total);
    }

    tracing::debug!(
        %repo,
        path = base,
        git_ref,
        files = total,
        dir = %target_dir.display(),
        "wrote skill files"
    );
    Ok(Access::Granted(total))
}

/// Removes `dir` and everything in it. A missing directory is not an error.
pub fn remove_skill_dir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn safe_relative(rel: &str) -> Result<PathBuf> {
    let path = Path::new(rel);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return Err(Error::UnsafePath(rel.to_string())),
        }
    }
    if out.as_os_str().is_empty() {
        return Err(Error::UnsafePath(rel.to_string()));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::{FakeGitHub, FakeRepo};

    fn repo() -> RepoId {
        RepoId::new("acme", "skills")
    }

    fn gh() -> FakeGitHub {
        FakeGitHub::new().with_repo(
            "acme/skills",
            FakeRepo::with_files(&[
                ("skills/pdf/SKILL.md", "---\nname: pdf\n---\n"),
                ("skills/pdf/scripts/extract.py", "print('hi')"),
                ("skills/pdf-extra/SKILL.md", "other"),
                ("README.md", "root"),
            ]),
        )
    }

    fn install_quiet(
        gh: &FakeGitHub,
        repo: &RepoId,
        path: &str,
        git_ref: &str,
        dir: &Path,
    ) -> Result<Access<usize>> {
        install_skill_files(gh, None, repo, path, git_ref, dir, |_, _| {})
    }

    #[test]
    fn writes_only_files_under_path() {
        let gh = gh();
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("pdf");
        let mut progress = Vec::new();

        let written =
            install_skill_files(&gh, None, &repo(), "skills/pdf", "main", &target, |w, t| {
                progress.push((w, t));
            })
            .unwrap();

        assert_eq!(written, Access::Granted(2));
        assert_eq!(progress, vec![(1, 2), (2, 2)]);
        assert_eq!(
            std::fs::read_to_string(target.join("scripts/extract.py")).unwrap(),
            "print('hi')"
        );
        assert!(target.join("SKILL.md").exists());
        assert!(!tmp.path().join("pdf-extra").exists());
    }

    #[test]
    fn root_path_installs_everything() {
        let gh = gh();
        let tmp = tempfile::tempdir().unwrap();
        let written = install_skill_files(&gh, None, &repo(), "", "main", tmp.path(), |_, _| {})
            .unwrap()
            .granted()
            .unwrap();
        assert_eq!(written, 4);
        assert!(tmp.path().join("README.md").exists());
    }

    #[test]
    fn empty_directory_is_distinct_error() {
        let gh = gh();
        let tmp = tempfile::tempdir().unwrap();
        let err = install_quiet(&gh, &repo(), "skills/none", "main", tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::EmptySkillDirectory { ref path, .. } if path == "skills/none"
        ));
    }

    #[test]
    fn truncated_tree_is_refused() {
        let gh = gh();
        gh.update("acme/skills", |r| r.truncated = true);
        let tmp = tempfile::tempdir().unwrap();
        let err = install_quiet(&gh, &repo(), "skills/pdf", "main", tmp.path()).unwrap_err();
        assert!(matches!(err, Error::TruncatedTree(_)));
    }

    #[test]
    fn mid_install_failure_leaves_partial_files() {
        let gh = gh();
        gh.update("acme/skills", |r| {
            r.failing.insert("skills/pdf/scripts/extract.py".into());
        });
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("pdf");
        let err = install_skill_files(&gh, None, &repo(), "skills/pdf", "main", &target, |_, _| {})
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert!(target.join("SKILL.md").exists());
    }

    #[test]
    fn auth_wall_on_later_file_is_returned() {
        let gh = gh();
        gh.update("acme/skills", |r| {
            r.denied.insert("skills/pdf/scripts/extract.py".into());
        });
        let tmp = tempfile::tempdir().unwrap();
        let access = install_quiet(&gh, &repo(), "skills/pdf", "main", tmp.path()).unwrap();
        assert!(matches!(access, Access::AuthRequired(_)));
    }

    #[test]
    fn installs_at_commit_sha() {
        let gh = gh();
        gh.update("acme/skills", |r| {
            r.commit("main", "sha2", &[("skills/pdf/SKILL.md", "v2")]);
        });
        let tmp = tempfile::tempdir().unwrap();
        let access = install_quiet(&gh, &repo(), "skills/pdf", "sha1", tmp.path()).unwrap();
        assert_eq!(access, Access::Granted(2));
        assert!(tmp.path().join("scripts/extract.py").exists());
    }

    #[test]
    fn unsafe_paths_are_rejected() {
        assert!(safe_relative("a/b.txt").is_ok());
        assert_eq!(safe_relative("./a").unwrap(), PathBuf::from("a"));
        for bad in ["../x", "a/../../x", "/etc/passwd", "."] {
            assert!(matches!(safe_relative(bad), Err(Error::UnsafePath(_))), "{bad}");
        }
    }

    #[test]
    fn traversal_in_tree_is_refused_before_writing() {
        let gh = FakeGitHub::new().with_repo(
            "acme/evil",
            FakeRepo::with_files(&[("s/SKILL.md", "x"), ("s/../../escape", "boom")]),
        );
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("s");
        let evil = RepoId::new("acme", "evil");
        let err = install_quiet(&gh, &evil, "s", "main", &target).unwrap_err();
        assert!(matches!(err, Error::UnsafePath(_)));
        assert!(!target.exists());
    }

    #[test]
    fn remove_missing_dir_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        remove_skill_dir(&tmp.path().join("nope")).unwrap();

        let dir = tmp.path().join("skill");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested/file"), "x").unwrap();
        remove_skill_dir(&dir).unwrap();
        assert!(!dir.exists());
    }
}
