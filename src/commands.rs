//! CLI command definitions
//!
//! All CLI structs and subcommand enums are defined here.

use clap::{Parser, Subcommand};
use gastown::polecat::PolecatState;

/// Gastown - polecat lifecycle and swarm coordination for a rig
#[derive(Parser, Debug)]
#[command(name = "gt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/gastown/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Rig to operate on (optional when only one rig is configured)
    #[arg(short, long, global = true, env = "GT_RIG")]
    pub rig: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage rigs (tracked repositories)
    #[command(subcommand)]
    Rig(RigCommands),

    /// Manage polecats (worker agents) in a rig
    #[command(subcommand)]
    Polecat(PolecatCommands),

    /// Hand out issues and inspect the swarm
    #[command(subcommand)]
    Swarm(SwarmCommands),

    /// Print version information
    Version {
        /// Print only the version string
        #[arg(long)]
        short: bool,

        /// Include commit, branch, current time and target
        #[arg(short = 'v', long)]
        verbose: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RigCommands {
    /// Register a rig
    Add {
        /// Rig name
        name: String,

        /// Local root directory of the rig
        path: String,

        /// URL polecat workspaces are cloned from
        url: String,
    },

    /// List registered rigs
    List,

    /// Unregister a rig (polecat workspaces are left on disk)
    Remove {
        /// Rig name to remove
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PolecatCommands {
    /// Create a polecat with its own clone and branch
    Add {
        /// Polecat name
        name: String,
    },

    /// Delete a polecat and its workspace
    Remove {
        /// Polecat name
        name: String,
    },

    /// List polecats in the rig
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show a single polecat
    Show {
        /// Polecat name
        name: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Move an idle polecat to active
    Wake {
        /// Polecat name
        name: String,
    },

    /// Move an active polecat back to idle
    Sleep {
        /// Polecat name
        name: String,
    },

    /// Assign an issue to a specific polecat
    Assign {
        /// Polecat name
        name: String,

        /// Issue identifier
        issue: String,
    },

    /// Clear a polecat's issue and return it to idle
    Clear {
        /// Polecat name
        name: String,
    },

    /// Force a polecat into a state
    State {
        /// Polecat name
        name: String,

        /// Target state (idle, active, working, done, stuck)
        state: PolecatState,
    },
}

#[derive(Subcommand, Debug)]
pub enum SwarmCommands {
    /// Assign an issue to the next available polecat
    Assign {
        /// Issue identifier
        issue: String,
    },

    /// Release a polecat's issue and return it to idle
    Release {
        /// Polecat name
        name: String,
    },

    /// Mark a polecat as stuck
    Stuck {
        /// Polecat name
        name: String,
    },

    /// Mark a polecat as done
    Done {
        /// Polecat name
        name: String,
    },

    /// Show swarm status for the rig
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}
