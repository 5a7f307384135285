//! Rig definition
//!
//! A rig is a tracked repository root that polecats clone from. Uses the
//! Builder pattern so required fields are checked in one place.

use crate::{GastownError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A named repository root with a local path and a remote URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rig {
    /// Rig name (typically the repository name)
    pub name: String,

    /// Local root directory of the rig
    pub path: PathBuf,

    /// URL polecat workspaces are cloned from
    pub git_url: String,
}

impl Rig {
    /// Create a new Rig builder
    pub fn builder() -> RigBuilder {
        RigBuilder::default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Builder for Rig
#[derive(Debug, Default)]
pub struct RigBuilder {
    name: Option<String>,
    path: Option<PathBuf>,
    git_url: Option<String>,
}

impl RigBuilder {
    /// Set the rig name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the local root
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the clone URL
    pub fn git_url(mut self, url: impl Into<String>) -> Self {
        self.git_url = Some(url.into());
        self
    }

    /// Build the Rig, returning an error if required fields are missing
    pub fn build(self) -> Result<Rig> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| GastownError::Config("Rig name is required".to_string()))?;
        let path = self
            .path
            .ok_or_else(|| GastownError::Config("Rig path is required".to_string()))?;
        let git_url = self
            .git_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| GastownError::Config("Rig git_url is required".to_string()))?;

        Ok(Rig {
            name,
            path,
            git_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_builder() {
        let rig = Rig::builder()
            .name("gastown")
            .path("/rigs/gastown")
            .git_url("https://github.com/example/gastown.git")
            .build()
            .unwrap();

        assert_eq!(rig.name, "gastown");
        assert_eq!(rig.path(), Path::new("/rigs/gastown"));
        assert_eq!(rig.git_url, "https://github.com/example/gastown.git");
    }

    #[test]
    fn test_rig_builder_missing_fields() {
        assert!(Rig::builder().path("/rigs/x").git_url("u").build().is_err());
        assert!(Rig::builder().name("x").git_url("u").build().is_err());
        assert!(Rig::builder().name("x").path("/rigs/x").build().is_err());
        assert!(Rig::builder()
            .name(" ")
            .path("/rigs/x")
            .git_url("u")
            .build()
            .is_err());
    }
}
