//! On-disk polecat state
//!
//! Each polecat lives in `<rig>/polecats/<name>/`, which is both its git
//! workspace and the home of its `state.json`. Writes go through a temp file
//! in the same directory and are renamed into place, so a reader sees either
//! the previous record or the new one, never a torn write.

use super::types::{branch_name, Polecat};
use crate::{GastownError, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Directory under the rig root that holds polecat workspaces
pub const POLECATS_DIR: &str = "polecats";

/// Name of the per-polecat state file
pub const STATE_FILE: &str = "state.json";

/// Prefix of the temp files `save` writes before renaming over `STATE_FILE`
pub const STATE_TEMP_PREFIX: &str = ".state.json.";

/// Outcome of loading a polecat's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded {
    /// Parsed from `state.json`
    Stored(Polecat),

    /// Workspace exists but has no `state.json`
    Synthesized(Polecat),
}

impl Loaded {
    pub fn is_synthesized(&self) -> bool {
        matches!(self, Loaded::Synthesized(_))
    }

    pub fn into_polecat(self) -> Polecat {
        match self {
            Loaded::Stored(p) | Loaded::Synthesized(p) => p,
        }
    }
}

/// File-backed store for the polecats of one rig
#[derive(Debug, Clone)]
pub struct PolecatStore {
    rig: String,
    root: PathBuf,
}

impl PolecatStore {
    /// Create a store rooted at `<rig_path>/polecats`
    pub fn new(rig: impl Into<String>, rig_path: &Path) -> Self {
        Self {
            rig: rig.into(),
            root: rig_path.join(POLECATS_DIR),
        }
    }

    /// Directory holding every polecat workspace
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Workspace directory for a polecat
    pub fn polecat_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// State file path for a polecat
    pub fn state_file(&self, name: &str) -> PathBuf {
        self.polecat_dir(name).join(STATE_FILE)
    }

    /// A polecat exists iff its workspace directory exists
    pub fn exists(&self, name: &str) -> bool {
        self.polecat_dir(name).is_dir()
    }

    /// Names of every workspace directory, sorted
    ///
    /// A missing root yields an empty list.
    pub fn names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GastownError::persistence(&self.root, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GastownError::persistence(&self.root, e))?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::warn!(entry = ?raw, "Skipping polecat directory with non UTF-8 name");
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Load a polecat's record
    ///
    /// Callers check existence first; a missing state file inside an existing
    /// workspace yields `Loaded::Synthesized`.
    pub fn load(&self, name: &str) -> Result<Loaded> {
        let path = self.state_file(name);

        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(polecat = name, "No state file, synthesizing idle record");
                return Ok(Loaded::Synthesized(Polecat::synthesized(
                    name,
                    &self.rig,
                    self.polecat_dir(name),
                )));
            }
            Err(e) => return Err(GastownError::persistence(path, e)),
        };

        let mut polecat: Polecat =
            serde_json::from_str(&data).map_err(|e| GastownError::persistence(&path, e))?;

        // Identity comes from the directory, never from the file contents
        polecat.name = name.to_string();
        polecat.rig = self.rig.clone();
        polecat.branch = branch_name(name);
        polecat.clone_path = self.polecat_dir(name);

        Ok(Loaded::Stored(polecat))
    }

    /// Atomically replace a polecat's state file
    pub fn save(&self, polecat: &Polecat) -> Result<()> {
        let path = self.state_file(&polecat.name);
        let dir = self.polecat_dir(&polecat.name);

        let payload =
            serde_json::to_vec_pretty(polecat).map_err(|e| GastownError::persistence(&path, e))?;

        let mut temp = tempfile::Builder::new()
            .prefix(STATE_TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| GastownError::persistence(&path, e))?;
        temp.write_all(&payload)
            .map_err(|e| GastownError::persistence(&path, e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| GastownError::persistence(&path, e))?;
        temp.persist(&path)
            .map_err(|e| GastownError::persistence(&path, e.error))?;

        tracing::debug!(
            polecat = %polecat.name,
            state = %polecat.state,
            path = %path.display(),
            "Saved polecat state"
        );
        Ok(())
    }
}
