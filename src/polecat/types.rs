//! Polecat record and lifecycle states
//!
//! Defines the persisted `Polecat` record, its `PolecatState`, and the
//! transition table that governs how the state may change.

use crate::{GastownError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Prefix of every polecat's dedicated branch
pub const BRANCH_PREFIX: &str = "polecat/";

/// Polecat lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolecatState {
    /// Not running and not assigned work
    Idle,

    /// Session is running but has no work
    Active,

    /// Working on an assigned issue
    Working,

    /// Finished its assigned work
    Done,

    /// Needs assistance before it can continue
    Stuck,
}

impl PolecatState {
    /// Every state, in lifecycle order
    pub const ALL: [PolecatState; 5] = [
        PolecatState::Idle,
        PolecatState::Active,
        PolecatState::Working,
        PolecatState::Done,
        PolecatState::Stuck,
    ];

    /// Check if the polecat can be assigned new work
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Idle | Self::Active)
    }

    /// Check if the polecat is working on an issue
    pub fn is_working(&self) -> bool {
        matches!(self, Self::Working)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Working => "working",
            Self::Done => "done",
            Self::Stuck => "stuck",
        }
    }
}

impl Default for PolecatState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for PolecatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PolecatState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "active" => Ok(Self::Active),
            "working" => Ok(Self::Working),
            "done" => Ok(Self::Done),
            "stuck" => Ok(Self::Stuck),
            other => Err(format!(
                "unknown polecat state '{}' (expected idle, active, working, done or stuck)",
                other
            )),
        }
    }
}

/// A named operation on the polecat state machine
///
/// All transition rules live here: `sources()` lists the states a transition
/// may start from (`None` means any state) and `target()` the state it ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// idle -> active
    Wake,

    /// active -> idle
    Sleep,

    /// any -> working, sets the issue
    AssignIssue,

    /// any -> idle, clears the issue
    ClearIssue,

    /// any -> the given state, issue untouched
    SetState(PolecatState),
}

impl Transition {
    /// States this transition may start from; `None` means unconstrained
    pub fn sources(&self) -> Option<&'static [PolecatState]> {
        match self {
            Self::Wake => Some(&[PolecatState::Idle]),
            Self::Sleep => Some(&[PolecatState::Active]),
            Self::AssignIssue | Self::ClearIssue | Self::SetState(_) => None,
        }
    }

    /// State the polecat is in after the transition
    pub fn target(&self) -> PolecatState {
        match self {
            Self::Wake => PolecatState::Active,
            Self::Sleep => PolecatState::Idle,
            Self::AssignIssue => PolecatState::Working,
            Self::ClearIssue => PolecatState::Idle,
            Self::SetState(state) => *state,
        }
    }

    /// Check whether the transition may start from `from`
    pub fn allows(&self, from: PolecatState) -> bool {
        self.sources().map_or(true, |states| states.contains(&from))
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wake => write!(f, "wake"),
            Self::Sleep => write!(f, "sleep"),
            Self::AssignIssue => write!(f, "assign issue"),
            Self::ClearIssue => write!(f, "clear issue"),
            Self::SetState(state) => write!(f, "set state to {}", state),
        }
    }
}

/// A worker agent bound to its own clone of a rig
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polecat {
    /// Identifier, unique within the rig
    pub name: String,

    /// Rig this polecat belongs to
    pub rig: String,

    /// Current lifecycle state
    pub state: PolecatState,

    /// Path to the polecat's clone of the rig
    pub clone_path: PathBuf,

    /// Dedicated working branch
    pub branch: String,

    /// Currently assigned issue, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,

    /// When the polecat was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// When the polecat was last updated
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Polecat {
    /// Create a freshly provisioned, idle polecat
    pub fn new(name: impl Into<String>, rig: impl Into<String>, clone_path: PathBuf) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            branch: branch_name(&name),
            name,
            rig: rig.into(),
            state: PolecatState::Idle,
            clone_path,
            issue: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Minimal record for a workspace that has no state file
    pub fn synthesized(
        name: impl Into<String>,
        rig: impl Into<String>,
        clone_path: PathBuf,
    ) -> Self {
        let name = name.into();
        Self {
            branch: branch_name(&name),
            name,
            rig: rig.into(),
            state: PolecatState::Idle,
            clone_path,
            issue: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Apply a transition, stamping `updated_at` on success
    ///
    /// `issue` is only consulted for `AssignIssue`.
    pub fn apply(&mut self, transition: Transition, issue: Option<&str>) -> Result<()> {
        if !transition.allows(self.state) {
            return Err(GastownError::InvalidTransition {
                name: self.name.clone(),
                from: self.state,
                transition,
            });
        }

        match transition {
            Transition::AssignIssue => {
                let issue = issue.filter(|i| !i.trim().is_empty()).ok_or_else(|| {
                    GastownError::InvalidIssue(issue.unwrap_or_default().to_string())
                })?;
                self.issue = Some(issue.to_string());
            }
            Transition::ClearIssue => self.issue = None,
            Transition::Wake | Transition::Sleep | Transition::SetState(_) => {}
        }

        self.state = transition.target();
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Concise view for status output
    pub fn summary(&self) -> PolecatSummary {
        PolecatSummary {
            name: self.name.clone(),
            state: self.state,
            issue: self.issue.clone(),
        }
    }

    /// Ordering key used when picking a polecat for new work
    pub(crate) fn seniority(&self) -> (Option<DateTime<Utc>>, &str) {
        (self.created_at, self.name.as_str())
    }
}

/// Concise view of a polecat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolecatSummary {
    pub name: String,
    pub state: PolecatState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

/// Branch name for a polecat
pub fn branch_name(name: &str) -> String {
    format!("{}{}", BRANCH_PREFIX, name)
}

/// Check that a name is safe to use as a single directory component
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.starts_with('.') {
        Some("name must not start with '.'")
    } else if name.contains(|c| matches!(c, '/' | '\\' | '\0')) {
        Some("name must not contain path separators")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(GastownError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
