//! Swarm coordination
//!
//! A swarm is the pool of polecats in one rig plus the logic that hands them
//! work. Assignment is availability-based: an `idle` or `active` polecat can
//! take an issue, the oldest one goes first, and no issue is ever held by
//! two polecats at once.
//!
//! # Example
//!
//! ```no_run
//! use gastown::rig::Rig;
//! use gastown::swarm::SwarmManager;
//!
//! let rig = Rig::builder()
//!     .name("gastown")
//!     .path("/rigs/gastown")
//!     .git_url("https://github.com/example/gastown.git")
//!     .build()?;
//!
//! let swarm = SwarmManager::with_git2(rig);
//! let polecat = swarm.assign_next("gt-42")?;
//! println!("{} is working on gt-42", polecat.name);
//!
//! // Later, once the polecat reports back
//! swarm.mark_done(&polecat.name)?;
//! swarm.release(&polecat.name)?;
//!
//! let status = swarm.status()?;
//! println!("{} of {} polecats available", status.available(), status.total);
//! # Ok::<(), gastown::GastownError>(())
//! ```

mod manager;

pub use manager::{SwarmManager, SwarmStatus};
