//! Error types for Gastown
//!
//! Every failure a polecat or swarm operation can produce is a distinct
//! variant, so callers (the CLI in particular) can branch on the kind
//! without matching on message text.

use crate::polecat::{PolecatState, Transition};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Gastown operations
pub type Result<T> = std::result::Result<T, GastownError>;

/// Boxed source error carried by the wrapping variants
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for Gastown operations
#[derive(Error, Debug)]
pub enum GastownError {
    /// Create was called for a name whose workspace already exists
    #[error("polecat already exists: {0}")]
    AlreadyExists(String),

    /// The polecat's workspace directory does not exist
    #[error("polecat not found: {0}")]
    NotFound(String),

    /// Delete refused because the workspace has local modifications
    #[error("polecat {0} has uncommitted changes")]
    HasUncommittedChanges(String),

    /// A guarded transition was requested from the wrong state
    #[error("polecat {name} cannot {transition} from state {from}")]
    InvalidTransition {
        name: String,
        from: PolecatState,
        transition: Transition,
    },

    /// No polecat in the rig satisfies the availability predicate
    #[error("no available polecat in rig {0}")]
    NoAvailableAgent(String),

    /// The issue is already carried by another polecat
    #[error("issue {issue} is already assigned to polecat {polecat}")]
    IssueAlreadyAssigned { issue: String, polecat: String },

    /// Polecat names become directory names, so they are restricted
    #[error("invalid polecat name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Issue identifiers must be non-empty
    #[error("invalid issue identifier {0:?}")]
    InvalidIssue(String),

    /// Workspace clone/branch/checkout failure
    #[error("provisioning {name} failed while {step}: {source}")]
    ProvisioningFailed {
        name: String,
        step: &'static str,
        #[source]
        source: BoxError,
    },

    /// State file read/write/serialize failure
    #[error("persisting state at {path} failed: {source}")]
    PersistenceFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// Rig lock could not be opened or acquired
    #[error("rig lock {path} unavailable: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Git2 library errors
    #[error("Git library error: {0}")]
    Git2(#[from] git2::Error),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl GastownError {
    /// Wrap a collaborator error raised during a provisioning step
    pub fn provisioning(
        name: impl Into<String>,
        step: &'static str,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::ProvisioningFailed {
            name: name.into(),
            step,
            source: source.into(),
        }
    }

    /// Wrap an I/O or serde error raised while touching a state file
    pub fn persistence(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::PersistenceFailed {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            GastownError::InvalidName { .. } | GastownError::InvalidIssue(_) => 2,
            GastownError::NotFound(_) => 3,
            GastownError::AlreadyExists(_) => 4,
            GastownError::HasUncommittedChanges(_) => 5,
            GastownError::InvalidTransition { .. } => 6,
            GastownError::NoAvailableAgent(_) => 7,
            GastownError::IssueAlreadyAssigned { .. } => 8,
            GastownError::ProvisioningFailed { .. }
            | GastownError::PersistenceFailed { .. }
            | GastownError::Lock { .. }
            | GastownError::Config(_)
            | GastownError::Git(_)
            | GastownError::Io(_)
            | GastownError::Json(_)
            | GastownError::Yaml(_)
            | GastownError::Git2(_)
            | GastownError::Anyhow(_) => 1,
        }
    }
}
