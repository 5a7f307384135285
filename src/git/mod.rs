//! Git operations for polecat workspaces
//!
//! Polecat managers only need four things from version control: clone the
//! rig, create a branch, check it out, and ask whether a workspace is dirty.
//! Those are expressed as the `VersionControl` trait so the lifecycle code
//! can be driven by `git2` in production and by fakes in tests.

mod operations;

pub use operations::Git2Workspace;

use crate::Result;
use std::path::Path;

/// Version-control capability consumed by the polecat manager
///
/// Every call names the workspace it operates on, so one implementation
/// can serve all polecats in a rig.
pub trait VersionControl: Send + Sync {
    /// Clone `url` into `dest`
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Create branch `name` at the workspace's current HEAD
    fn create_branch(&self, workdir: &Path, name: &str) -> Result<()>;

    /// Check out branch `name` in the workspace
    fn checkout(&self, workdir: &Path, name: &str) -> Result<()>;

    /// Report whether the workspace has local modifications
    fn has_uncommitted_changes(&self, workdir: &Path) -> Result<bool>;
}

impl<T: VersionControl + ?Sized> VersionControl for std::sync::Arc<T> {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        (**self).clone_repo(url, dest)
    }

    fn create_branch(&self, workdir: &Path, name: &str) -> Result<()> {
        (**self).create_branch(workdir, name)
    }

    fn checkout(&self, workdir: &Path, name: &str) -> Result<()> {
        (**self).checkout(workdir, name)
    }

    fn has_uncommitted_changes(&self, workdir: &Path) -> Result<bool> {
        (**self).has_uncommitted_changes(workdir)
    }
}
