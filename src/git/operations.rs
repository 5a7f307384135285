//! `git2`-backed workspace operations

use super::VersionControl;
use crate::{GastownError, Result};
use git2::{Cred, FetchOptions, RemoteCallbacks, Repository, StatusOptions};
use std::path::{Path, PathBuf};

/// Version control through libgit2
///
/// Paths registered with `ignore` or `ignore_prefix` are left out of the
/// dirtiness check. The polecat manager registers its `state.json` and the
/// temp files written next to it, which live in the workspace but are not
/// part of the polecat's work.
#[derive(Debug, Clone, Default)]
pub struct Git2Workspace {
    ignored: Vec<PathBuf>,
    ignored_prefixes: Vec<String>,
}

impl Git2Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude a workspace-relative path from `has_uncommitted_changes`
    pub fn ignore(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignored.push(path.into());
        self
    }

    /// Exclude top-level entries whose name starts with `prefix`
    pub fn ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignored_prefixes.push(prefix.into());
        self
    }

    fn is_ignored(&self, path: &str) -> bool {
        self.ignored.iter().any(|ignored| Path::new(path) == ignored)
            || (!path.contains('/')
                && self
                    .ignored_prefixes
                    .iter()
                    .any(|prefix| path.starts_with(prefix.as_str())))
    }

    fn open(workdir: &Path) -> Result<Repository> {
        Repository::open(workdir).map_err(|e| {
            GastownError::Git(format!(
                "Failed to open repository at {}: {}",
                workdir.display(),
                e
            ))
        })
    }

    fn create_callbacks<'a>() -> RemoteCallbacks<'a> {
        let mut callbacks = RemoteCallbacks::new();
        let token = std::env::var("GITHUB_TOKEN").ok();

        callbacks.credentials(move |url, username_from_url, _allowed_types| {
            tracing::debug!(url, "Git credentials callback invoked");

            if let Some(ref token) = token {
                return Cred::userpass_plaintext(username_from_url.unwrap_or("git"), token);
            }
            if let Some(username) = username_from_url {
                return Cred::ssh_key_from_agent(username);
            }
            Cred::default()
        });

        callbacks
    }
}

impl VersionControl for Git2Workspace {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!(url, path = %dest.display(), "Cloning rig repository");

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(Self::create_callbacks());

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_options);
        builder.clone(url, dest)?;

        tracing::debug!(path = %dest.display(), "Repository cloned successfully");
        Ok(())
    }

    fn create_branch(&self, workdir: &Path, name: &str) -> Result<()> {
        let repo = Self::open(workdir)?;
        let commit = repo.head()?.peel_to_commit()?;
        repo.branch(name, &commit, false)?;

        tracing::debug!(branch = %name, path = %workdir.display(), "Created branch");
        Ok(())
    }

    fn checkout(&self, workdir: &Path, name: &str) -> Result<()> {
        let repo = Self::open(workdir)?;

        let refname = format!("refs/heads/{}", name);
        let obj = repo.revparse_single(&refname)?;

        let mut checkout_builder = git2::build::CheckoutBuilder::new();
        checkout_builder.safe();

        repo.checkout_tree(&obj, Some(&mut checkout_builder))?;
        repo.set_head(&refname)?;

        tracing::debug!(branch = %name, path = %workdir.display(), "Checked out branch");
        Ok(())
    }

    fn has_uncommitted_changes(&self, workdir: &Path) -> Result<bool> {
        let repo = Self::open(workdir)?;

        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(false)
            .include_ignored(false);

        let statuses = repo.statuses(Some(&mut options))?;
        let dirty = statuses.iter().any(|entry| match entry.path() {
            Some(path) => !self.is_ignored(path),
            None => true,
        });

        Ok(dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    fn init_origin(dir: &Path) {
        let repo = Repository::init(dir).unwrap();
        fs::write(dir.join("README.md"), "# rig\n").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Mayor", "mayor@gastown.local").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
    }

    fn cloned_workspace(git: &Git2Workspace) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let origin = temp.path().join("origin");
        fs::create_dir_all(&origin).unwrap();
        init_origin(&origin);

        let dest = temp.path().join("polecats").join("rex");
        git.clone_repo(origin.to_str().unwrap(), &dest).unwrap();
        (temp, dest)
    }

    #[test]
    fn test_clone_branch_checkout() {
        let git = Git2Workspace::new();
        let (_temp, dest) = cloned_workspace(&git);

        assert!(dest.join("README.md").exists());

        git.create_branch(&dest, "polecat/rex").unwrap();
        git.checkout(&dest, "polecat/rex").unwrap();

        let repo = Repository::open(&dest).unwrap();
        let head = repo.head().unwrap();
        assert_eq!(head.shorthand(), Some("polecat/rex"));
    }

    #[test]
    fn test_has_uncommitted_changes() {
        let git = Git2Workspace::new().ignore("state.json");
        let (_temp, dest) = cloned_workspace(&git);

        assert!(!git.has_uncommitted_changes(&dest).unwrap());

        fs::write(dest.join("state.json"), "{}").unwrap();
        assert!(!git.has_uncommitted_changes(&dest).unwrap());

        fs::write(dest.join("README.md"), "# changed\n").unwrap();
        assert!(git.has_uncommitted_changes(&dest).unwrap());
    }

    #[test]
    fn test_ignored_prefix_is_not_a_change() {
        let git = Git2Workspace::new().ignore_prefix(".state.json.");
        let (_temp, dest) = cloned_workspace(&git);

        fs::write(dest.join(".state.json.a1b2c3.tmp"), "{").unwrap();
        assert!(!git.has_uncommitted_changes(&dest).unwrap());

        fs::create_dir_all(dest.join("docs")).unwrap();
        fs::write(dest.join("docs").join(".state.json.x"), "{").unwrap();
        assert!(git.has_uncommitted_changes(&dest).unwrap());
    }

    #[test]
    fn test_untracked_file_is_a_change() {
        let git = Git2Workspace::new();
        let (_temp, dest) = cloned_workspace(&git);

        fs::write(dest.join("notes.txt"), "wip").unwrap();
        assert!(git.has_uncommitted_changes(&dest).unwrap());
    }

    #[test]
    fn test_clone_missing_origin_fails() {
        let temp = TempDir::new().unwrap();
        let git = Git2Workspace::new();

        let missing = temp.path().join("no-such-repo");
        let result = git.clone_repo(missing.to_str().unwrap(), &temp.path().join("dest"));
        assert!(result.is_err());
    }

    #[test]
    fn test_status_outside_repository_fails() {
        let temp = TempDir::new().unwrap();
        let git = Git2Workspace::new();

        assert!(matches!(
            git.has_uncommitted_changes(temp.path()),
            Err(GastownError::Git(_))
        ));
    }
}
