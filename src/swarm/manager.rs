//! Swarm Manager for work assignment
//!
//! Matches issues to available polecats of one rig. The pool is read from
//! disk on every call, so it always reflects the polecats that actually
//! exist; the select-then-assign step runs under the rig lock so two callers
//! can never pick the same polecat or hand the same issue to two polecats.

use crate::git::VersionControl;
use crate::polecat::{Polecat, PolecatManager, PolecatState, PolecatSummary, Transition};
use crate::rig::Rig;
use crate::{GastownError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Swarm Manager
///
/// Coordinates work across the polecats of a single rig.
#[derive(Debug)]
pub struct SwarmManager {
    rig: Rig,
    work_dir: PathBuf,
    polecats: PolecatManager,
}

impl SwarmManager {
    /// Create a swarm manager for `rig`
    pub fn new(rig: Rig, vcs: Arc<dyn VersionControl>) -> Self {
        Self::from_manager(PolecatManager::new(rig, vcs))
    }

    /// Create a swarm manager backed by libgit2
    pub fn with_git2(rig: Rig) -> Self {
        Self::from_manager(PolecatManager::with_git2(rig))
    }

    /// Wrap an existing polecat manager
    pub fn from_manager(polecats: PolecatManager) -> Self {
        let rig = polecats.rig().clone();
        Self {
            work_dir: rig.path.clone(),
            rig,
            polecats,
        }
    }

    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    /// Root directory the swarm works in
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Underlying polecat manager
    pub fn polecats(&self) -> &PolecatManager {
        &self.polecats
    }

    /// Polecats that can take new work, in assignment order
    ///
    /// Oldest first; records without a creation time sort ahead of all
    /// others, and ties are broken by name.
    pub fn available(&self) -> Result<Vec<Polecat>> {
        let mut available: Vec<Polecat> = self
            .polecats
            .list()?
            .into_iter()
            .filter(|p| p.state.is_available())
            .collect();
        available.sort_by(|a, b| a.seniority().cmp(&b.seniority()));
        Ok(available)
    }

    /// Assign `issue` to the next available polecat
    pub fn assign_next(&self, issue: &str) -> Result<Polecat> {
        if issue.trim().is_empty() {
            return Err(GastownError::InvalidIssue(issue.to_string()));
        }

        let _lock = self.polecats.lock()?;
        let pool = self.polecats.list()?;

        if let Some(holder) = pool.iter().find(|p| p.issue.as_deref() == Some(issue)) {
            return Err(GastownError::IssueAlreadyAssigned {
                issue: issue.to_string(),
                polecat: holder.name.clone(),
            });
        }

        let chosen = pool
            .iter()
            .filter(|p| p.state.is_available())
            .min_by(|a, b| a.seniority().cmp(&b.seniority()))
            .ok_or_else(|| GastownError::NoAvailableAgent(self.rig.name.clone()))?;

        debug!(
            polecat = %chosen.name,
            state = %chosen.state,
            pool = pool.len(),
            "Selected polecat for assignment"
        );

        let polecat = self
            .polecats
            .transition_locked(&chosen.name, Transition::AssignIssue, Some(issue))?;

        info!(polecat = %polecat.name, issue = %issue, rig = %self.rig.name, "Assigned issue");
        Ok(polecat)
    }

    /// Return a polecat to the pool, clearing its issue
    pub fn release(&self, name: &str) -> Result<Polecat> {
        let polecat = self.polecats.clear_issue(name)?;
        info!(polecat = %name, rig = %self.rig.name, "Released polecat");
        Ok(polecat)
    }

    /// Mark a polecat as stuck; its issue is kept for inspection
    pub fn mark_stuck(&self, name: &str) -> Result<Polecat> {
        let polecat = self.polecats.set_state(name, PolecatState::Stuck)?;
        info!(polecat = %name, issue = ?polecat.issue, "Polecat marked stuck");
        Ok(polecat)
    }

    /// Mark a polecat as done; its issue is kept until released
    pub fn mark_done(&self, name: &str) -> Result<Polecat> {
        let polecat = self.polecats.set_state(name, PolecatState::Done)?;
        info!(polecat = %name, issue = ?polecat.issue, "Polecat marked done");
        Ok(polecat)
    }

    /// Read-only snapshot of the swarm
    pub fn status(&self) -> Result<SwarmStatus> {
        let polecats = self.polecats.list()?;

        let mut status = SwarmStatus {
            rig: self.rig.name.clone(),
            total: polecats.len(),
            ..SwarmStatus::default()
        };

        for polecat in &polecats {
            match polecat.state {
                PolecatState::Idle => status.idle += 1,
                PolecatState::Active => status.active += 1,
                PolecatState::Working => status.working += 1,
                PolecatState::Done => status.done += 1,
                PolecatState::Stuck => status.stuck += 1,
            }
            status.polecats.push(polecat.summary());
        }

        Ok(status)
    }
}

/// Snapshot of a rig's swarm
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwarmStatus {
    pub rig: String,
    pub total: usize,
    pub idle: usize,
    pub active: usize,
    pub working: usize,
    pub done: usize,
    pub stuck: usize,
    pub polecats: Vec<PolecatSummary>,
}

impl SwarmStatus {
    /// Number of polecats in `state`
    pub fn count(&self, state: PolecatState) -> usize {
        match state {
            PolecatState::Idle => self.idle,
            PolecatState::Active => self.active,
            PolecatState::Working => self.working,
            PolecatState::Done => self.done,
            PolecatState::Stuck => self.stuck,
        }
    }

    /// Number of polecats that can take new work
    pub fn available(&self) -> usize {
        self.idle + self.active
    }
}
