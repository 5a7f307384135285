//! Polecat Manager for lifecycle operations
//!
//! Creates, deletes, inspects and transitions the polecats of one rig. The
//! rig's `polecats/` directory is the source of truth: every call re-reads
//! it, and every mutation rewrites the affected `state.json` before
//! returning.

use super::lock::RigLock;
use super::storage::{PolecatStore, STATE_FILE, STATE_TEMP_PREFIX};
use super::types::{validate_name, Polecat, PolecatState, Transition};
use crate::git::{Git2Workspace, VersionControl};
use crate::rig::Rig;
use crate::{GastownError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Polecat Manager
///
/// Central manager for the polecats of a single rig.
pub struct PolecatManager {
    rig: Rig,
    store: PolecatStore,
    vcs: Arc<dyn VersionControl>,

    /// Treat a failed dirtiness check as dirty instead of clean
    strict_delete: bool,
}

impl std::fmt::Debug for PolecatManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolecatManager")
            .field("rig", &self.rig.name)
            .field("root", &self.store.root())
            .field("strict_delete", &self.strict_delete)
            .finish()
    }
}

impl PolecatManager {
    /// Create a manager for `rig` using the given version control
    pub fn new(rig: Rig, vcs: Arc<dyn VersionControl>) -> Self {
        let store = PolecatStore::new(&rig.name, &rig.path);
        Self {
            rig,
            store,
            vcs,
            strict_delete: false,
        }
    }

    /// Create a manager backed by libgit2
    pub fn with_git2(rig: Rig) -> Self {
        let git = Git2Workspace::new()
            .ignore(STATE_FILE)
            .ignore_prefix(STATE_TEMP_PREFIX);
        Self::new(rig, Arc::new(git))
    }

    /// Block deletion when the uncommitted-changes check itself fails
    pub fn with_strict_delete(mut self, strict: bool) -> Self {
        self.strict_delete = strict;
        self
    }

    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    /// Workspace directory for a polecat
    pub fn polecat_dir(&self, name: &str) -> PathBuf {
        self.store.polecat_dir(name)
    }

    /// Take the rig lock
    pub(crate) fn lock(&self) -> Result<RigLock> {
        RigLock::acquire(&self.rig.path)
    }

    /// Create a new polecat with its own clone of the rig
    ///
    /// Fails with `AlreadyExists` before touching the filesystem if the
    /// workspace is already there. Any failure after the clone starts removes
    /// the partial workspace.
    pub fn create(&self, name: &str) -> Result<Polecat> {
        validate_name(name)?;
        if self.store.exists(name) {
            return Err(GastownError::AlreadyExists(name.to_string()));
        }

        let _lock = self.lock()?;
        if self.store.exists(name) {
            return Err(GastownError::AlreadyExists(name.to_string()));
        }

        let path = self.store.polecat_dir(name);
        std::fs::create_dir_all(self.store.root())
            .map_err(|e| GastownError::provisioning(name, "creating polecats dir", e))?;

        let polecat = Polecat::new(name, &self.rig.name, path.clone());

        if let Err(e) = self.provision(&path, &polecat.branch) {
            self.rollback(&path);
            return Err(GastownError::provisioning(name, e.0, e.1));
        }

        if let Err(e) = self.store.save(&polecat) {
            self.rollback(&path);
            return Err(e);
        }

        info!(
            polecat = %name,
            rig = %self.rig.name,
            branch = %polecat.branch,
            "Created polecat"
        );
        Ok(polecat)
    }

    fn provision(
        &self,
        path: &Path,
        branch: &str,
    ) -> std::result::Result<(), (&'static str, GastownError)> {
        self.vcs
            .clone_repo(&self.rig.git_url, path)
            .map_err(|e| ("cloning rig", e))?;
        self.vcs
            .create_branch(path, branch)
            .map_err(|e| ("creating branch", e))?;
        self.vcs
            .checkout(path, branch)
            .map_err(|e| ("checking out branch", e))?;
        Ok(())
    }

    // The provisioning error is what the caller needs; a failed cleanup is
    // only logged.
    fn rollback(&self, path: &Path) {
        if let Err(e) = std::fs::remove_dir_all(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(path = %path.display(), error = %e, "Rollback could not remove workspace");
            }
        }
    }

    /// Delete a polecat and its workspace
    pub fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        if !self.store.exists(name) {
            return Err(GastownError::NotFound(name.to_string()));
        }

        let _lock = self.lock()?;
        if !self.store.exists(name) {
            return Err(GastownError::NotFound(name.to_string()));
        }

        let path = self.store.polecat_dir(name);
        match self.vcs.has_uncommitted_changes(&path) {
            Ok(true) => return Err(GastownError::HasUncommittedChanges(name.to_string())),
            Ok(false) => {}
            Err(e) if self.strict_delete => {
                warn!(polecat = %name, error = %e, "Uncommitted changes check failed, refusing to delete");
                return Err(GastownError::HasUncommittedChanges(name.to_string()));
            }
            Err(e) => {
                warn!(polecat = %name, error = %e, "Uncommitted changes check failed, assuming clean");
            }
        }

        std::fs::remove_dir_all(&path).map_err(|e| GastownError::persistence(&path, e))?;

        info!(polecat = %name, rig = %self.rig.name, "Deleted polecat");
        Ok(())
    }

    /// Get a polecat by name
    ///
    /// A workspace with no state file is reported as an idle polecat.
    pub fn get(&self, name: &str) -> Result<Polecat> {
        validate_name(name)?;
        if !self.store.exists(name) {
            return Err(GastownError::NotFound(name.to_string()));
        }
        Ok(self.store.load(name)?.into_polecat())
    }

    /// List every polecat in the rig, sorted by name
    ///
    /// Entries that cannot be loaded are skipped.
    pub fn list(&self) -> Result<Vec<Polecat>> {
        let mut polecats = Vec::new();
        for name in self.store.names()? {
            match self.get(&name) {
                Ok(polecat) => polecats.push(polecat),
                Err(e) => warn!(polecat = %name, error = %e, "Skipping unreadable polecat"),
            }
        }
        Ok(polecats)
    }

    /// Override a polecat's state
    pub fn set_state(&self, name: &str, state: PolecatState) -> Result<Polecat> {
        self.transition(name, Transition::SetState(state), None)
    }

    /// Assign an issue, moving the polecat to `working`
    pub fn assign_issue(&self, name: &str, issue: &str) -> Result<Polecat> {
        self.transition(name, Transition::AssignIssue, Some(issue))
    }

    /// Clear the issue, returning the polecat to `idle`
    pub fn clear_issue(&self, name: &str) -> Result<Polecat> {
        self.transition(name, Transition::ClearIssue, None)
    }

    /// Transition from idle to active
    pub fn wake(&self, name: &str) -> Result<Polecat> {
        self.transition(name, Transition::Wake, None)
    }

    /// Transition from active to idle
    pub fn sleep(&self, name: &str) -> Result<Polecat> {
        self.transition(name, Transition::Sleep, None)
    }

    fn transition(
        &self,
        name: &str,
        transition: Transition,
        issue: Option<&str>,
    ) -> Result<Polecat> {
        validate_name(name)?;
        let _lock = self.lock()?;
        self.transition_locked(name, transition, issue)
    }

    /// Load, transition and persist; the caller holds the rig lock
    pub(crate) fn transition_locked(
        &self,
        name: &str,
        transition: Transition,
        issue: Option<&str>,
    ) -> Result<Polecat> {
        let mut polecat = self.get(name)?;
        let from = polecat.state;

        polecat.apply(transition, issue)?;
        self.store.save(&polecat)?;

        debug!(
            polecat = %name,
            %transition,
            from = %from,
            to = %polecat.state,
            "Polecat transitioned"
        );
        Ok(polecat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::FakeVcs;
    use std::fs;
    use tempfile::TempDir;

    fn setup(vcs: FakeVcs) -> (TempDir, PolecatManager, Arc<FakeVcs>) {
        let temp = TempDir::new().unwrap();
        let rig = Rig::builder()
            .name("main")
            .path(temp.path().join("main"))
            .git_url("https://example.com/main.git")
            .build()
            .unwrap();
        let vcs = Arc::new(vcs);
        let manager = PolecatManager::new(rig, vcs.clone());
        (temp, manager, vcs)
    }

    #[test]
    fn test_create_polecat() {
        let (_temp, manager, vcs) = setup(FakeVcs::new());

        let polecat = manager.create("rex").unwrap();
        assert_eq!(polecat.name, "rex");
        assert_eq!(polecat.rig, "main");
        assert_eq!(polecat.state, PolecatState::Idle);
        assert_eq!(polecat.branch, "polecat/rex");
        assert_eq!(polecat.clone_path, manager.rig().path.join("polecats/rex"));
        assert!(polecat.issue.is_none());
        assert!(polecat.created_at.is_some());

        assert_eq!(
            vcs.calls(),
            vec![
                "clone https://example.com/main.git".to_string(),
                "branch polecat/rex".to_string(),
                "checkout polecat/rex".to_string(),
            ]
        );

        let loaded = manager.get("rex").unwrap();
        assert_eq!(loaded, polecat);
    }

    #[test]
    fn test_create_existing_fails_without_side_effects() {
        let (_temp, manager, vcs) = setup(FakeVcs::new());
        let dir = manager.polecat_dir("rex");
        fs::create_dir_all(&dir).unwrap();

        assert!(matches!(
            manager.create("rex"),
            Err(GastownError::AlreadyExists(_))
        ));
        assert!(vcs.calls().is_empty());
        assert!(!dir.join(STATE_FILE).exists());
        assert!(!manager.rig().path.join(crate::polecat::lock::LOCK_FILE).exists());
    }

    #[test]
    fn test_create_rolls_back_on_provisioning_failure() {
        for step in ["clone", "branch", "checkout"] {
            let (_temp, manager, _vcs) = setup(FakeVcs::failing(step));

            let err = manager.create("rex").unwrap_err();
            assert!(
                matches!(err, GastownError::ProvisioningFailed { .. }),
                "{}: {}",
                step,
                err
            );
            assert!(!manager.polecat_dir("rex").exists(), "{} left a workspace", step);
            assert!(matches!(manager.get("rex"), Err(GastownError::NotFound(_))));
        }
    }

    #[test]
    fn test_create_rolls_back_on_persistence_failure() {
        let (_temp, manager, vcs) = setup(FakeVcs::blocking_state_file());

        let err = manager.create("rex").unwrap_err();
        assert!(
            matches!(err, GastownError::PersistenceFailed { .. }),
            "{}",
            err
        );
        assert_eq!(vcs.calls().len(), 3);
        assert!(!manager.polecat_dir("rex").exists());
        assert!(manager.list().unwrap().is_empty());
    }

    #[test]
    fn test_create_rejects_invalid_name() {
        let (_temp, manager, vcs) = setup(FakeVcs::new());

        assert!(matches!(
            manager.create("../escape"),
            Err(GastownError::InvalidName { .. })
        ));
        assert!(vcs.calls().is_empty());
        assert!(!manager.rig().path.exists());
    }

    #[test]
    fn test_delete_polecat() {
        let (_temp, manager, _vcs) = setup(FakeVcs::new());
        manager.create("rex").unwrap();

        manager.delete("rex").unwrap();
        assert!(!manager.polecat_dir("rex").exists());
        assert!(matches!(manager.get("rex"), Err(GastownError::NotFound(_))));
    }

    #[test]
    fn test_delete_missing() {
        let (_temp, manager, _vcs) = setup(FakeVcs::new());
        assert!(matches!(
            manager.delete("ghost"),
            Err(GastownError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_blocked_by_changes() {
        let (_temp, manager, vcs) = setup(FakeVcs::new());
        manager.create("rex").unwrap();
        vcs.set_dirty(true);

        assert!(matches!(
            manager.delete("rex"),
            Err(GastownError::HasUncommittedChanges(_))
        ));
        assert!(manager.polecat_dir("rex").exists());
    }

    #[test]
    fn test_delete_when_check_fails() {
        let (_temp, manager, vcs) = setup(FakeVcs::new());
        manager.create("rex").unwrap();
        vcs.set_status_error(true);

        manager.delete("rex").unwrap();
        assert!(!manager.polecat_dir("rex").exists());
    }

    #[test]
    fn test_strict_delete_when_check_fails() {
        let (_temp, manager, vcs) = setup(FakeVcs::new());
        let manager = manager.with_strict_delete(true);
        manager.create("rex").unwrap();
        vcs.set_status_error(true);

        assert!(matches!(
            manager.delete("rex"),
            Err(GastownError::HasUncommittedChanges(_))
        ));
        assert!(manager.polecat_dir("rex").exists());
    }

    #[test]
    fn test_get_bare_workspace() {
        let (_temp, manager, _vcs) = setup(FakeVcs::new());
        fs::create_dir_all(manager.polecat_dir("nux")).unwrap();

        let polecat = manager.get("nux").unwrap();
        assert_eq!(polecat.state, PolecatState::Idle);
        assert_eq!(polecat.branch, "polecat/nux");
        assert!(polecat.issue.is_none());
        assert!(polecat.created_at.is_none());
        assert!(polecat.updated_at.is_none());
    }

    #[test]
    fn test_list() {
        let (_temp, manager, _vcs) = setup(FakeVcs::new());
        assert!(manager.list().unwrap().is_empty());

        manager.create("toast").unwrap();
        manager.create("ace").unwrap();
        fs::create_dir_all(manager.polecat_dir("nux")).unwrap();
        fs::write(manager.rig().path.join("polecats/notes.txt"), "x").unwrap();

        let corrupt = manager.polecat_dir("broken");
        fs::create_dir_all(&corrupt).unwrap();
        fs::write(corrupt.join(STATE_FILE), "not json").unwrap();

        let names: Vec<String> = manager.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["ace", "nux", "toast"]);

        assert!(matches!(
            manager.get("broken"),
            Err(GastownError::PersistenceFailed { .. })
        ));
    }

    #[test]
    fn test_copied_state_file_mutates_only_its_own_polecat() {
        let (_temp, manager, _vcs) = setup(FakeVcs::new());
        manager.create("rex").unwrap();
        manager.assign_issue("rex", "ISSUE-7").unwrap();

        fs::create_dir_all(manager.polecat_dir("nux")).unwrap();
        fs::copy(
            manager.polecat_dir("rex").join(STATE_FILE),
            manager.polecat_dir("nux").join(STATE_FILE),
        )
        .unwrap();

        let nux = manager.clear_issue("nux").unwrap();
        assert_eq!(nux.name, "nux");
        assert_eq!(nux.state, PolecatState::Idle);

        let nux = manager.get("nux").unwrap();
        assert_eq!(nux.name, "nux");
        assert!(nux.issue.is_none());

        let rex = manager.get("rex").unwrap();
        assert_eq!(rex.state, PolecatState::Working);
        assert_eq!(rex.issue.as_deref(), Some("ISSUE-7"));

        let names: Vec<String> = manager.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["nux", "rex"]);
    }

    #[test]
    fn test_wake_and_sleep() {
        let (_temp, manager, _vcs) = setup(FakeVcs::new());
        manager.create("rex").unwrap();

        assert!(matches!(
            manager.sleep("rex"),
            Err(GastownError::InvalidTransition { .. })
        ));

        let polecat = manager.wake("rex").unwrap();
        assert_eq!(polecat.state, PolecatState::Active);
        assert_eq!(manager.get("rex").unwrap().state, PolecatState::Active);

        assert!(matches!(
            manager.wake("rex"),
            Err(GastownError::InvalidTransition { .. })
        ));

        manager.sleep("rex").unwrap();
        assert_eq!(manager.get("rex").unwrap().state, PolecatState::Idle);
    }

    #[test]
    fn test_assign_and_clear_issue() {
        let (_temp, manager, _vcs) = setup(FakeVcs::new());
        let created = manager.create("rex").unwrap();

        manager.assign_issue("rex", "ISSUE-7").unwrap();
        let polecat = manager.get("rex").unwrap();
        assert_eq!(polecat.state, PolecatState::Working);
        assert_eq!(polecat.issue.as_deref(), Some("ISSUE-7"));
        assert!(polecat.updated_at >= created.updated_at);
        assert_eq!(polecat.created_at, created.created_at);

        manager.set_state("rex", PolecatState::Stuck).unwrap();
        manager.clear_issue("rex").unwrap();
        let polecat = manager.get("rex").unwrap();
        assert_eq!(polecat.state, PolecatState::Idle);
        assert!(polecat.issue.is_none());

        let json = fs::read_to_string(manager.polecat_dir("rex").join(STATE_FILE)).unwrap();
        assert!(!json.contains("\"issue\""));
    }

    #[test]
    fn test_mutations_on_missing_polecat() {
        let (_temp, manager, _vcs) = setup(FakeVcs::new());

        assert!(matches!(manager.wake("ghost"), Err(GastownError::NotFound(_))));
        assert!(matches!(
            manager.assign_issue("ghost", "ISSUE-1"),
            Err(GastownError::NotFound(_))
        ));
        assert!(matches!(
            manager.set_state("ghost", PolecatState::Done),
            Err(GastownError::NotFound(_))
        ));
    }

    #[test]
    fn test_failed_mutation_does_not_stick() {
        let (_temp, manager, _vcs) = setup(FakeVcs::new());
        manager.create("rex").unwrap();
        manager.set_state("rex", PolecatState::Working).unwrap();

        assert!(manager.wake("rex").is_err());
        assert!(manager.assign_issue("rex", "").is_err());

        let polecat = manager.get("rex").unwrap();
        assert_eq!(polecat.state, PolecatState::Working);
        assert!(polecat.issue.is_none());
    }

    #[test]
    fn test_transition_persists_for_bare_workspace() {
        let (_temp, manager, _vcs) = setup(FakeVcs::new());
        fs::create_dir_all(manager.polecat_dir("nux")).unwrap();

        manager.wake("nux").unwrap();
        assert!(manager.polecat_dir("nux").join(STATE_FILE).exists());
        assert_eq!(manager.get("nux").unwrap().state, PolecatState::Active);
    }
}
