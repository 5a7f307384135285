//! Gastown - polecat lifecycle and swarm coordination
//!
//! A rig is a tracked repository. Polecats are ephemeral worker agents, each
//! with its own clone of the rig on a dedicated branch. This crate manages
//! their lifecycle on disk and hands them issues through a swarm coordinator.
//!
//! # Architecture
//!
//! - **polecat**: Polecat records, state machine, persistence and the lifecycle manager
//! - **swarm**: Availability-based issue assignment and pool status
//! - **git**: Version-control seam (`VersionControl`) with a git2 implementation
//! - **rig**: Rig definition
//! - **config**: ~/.config/gastown/config.yaml handling and validation
//! - **logging**: tracing subscriber setup

pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod polecat;
pub mod rig;
pub mod swarm;

// Re-exports
pub use error::{GastownError, Result};
