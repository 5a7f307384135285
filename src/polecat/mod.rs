//! Polecat lifecycle management
//!
//! A polecat is an ephemeral worker bound to its own clone of a rig, on its
//! own `polecat/<name>` branch. This module owns the polecat record, its
//! state machine, and the manager that creates, deletes and transitions
//! polecats on disk.
//!
//! # Layout
//!
//! ```text
//! <rig>/
//!   .polecats.lock          rig-wide advisory lock
//!   polecats/
//!     rex/                  git workspace of polecat "rex"
//!       state.json          persisted Polecat record
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gastown::polecat::PolecatManager;
//! use gastown::rig::Rig;
//!
//! let rig = Rig::builder()
//!     .name("gastown")
//!     .path("/rigs/gastown")
//!     .git_url("https://github.com/example/gastown.git")
//!     .build()?;
//!
//! let manager = PolecatManager::with_git2(rig);
//! manager.create("rex")?;
//! manager.assign_issue("rex", "gt-42")?;
//! manager.clear_issue("rex")?;
//! manager.delete("rex")?;
//! # Ok::<(), gastown::GastownError>(())
//! ```

mod lock;
mod manager;
mod storage;
mod types;

pub use lock::{RigLock, LOCK_FILE};
pub use manager::PolecatManager;
pub use storage::{Loaded, PolecatStore, POLECATS_DIR, STATE_FILE, STATE_TEMP_PREFIX};
pub use types::{
    branch_name, validate_name, Polecat, PolecatState, PolecatSummary, Transition, BRANCH_PREFIX,
};
