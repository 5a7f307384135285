//! Gastown configuration file handling
//!
//! Loads and manages the ~/.config/gastown/config.yaml file listing the rigs
//! polecats can be created in.

use crate::rig::Rig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Swarm behaviour settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwarmConfig {
    /// Refuse to delete a polecat when its uncommitted-changes check fails
    #[serde(default)]
    pub strict_delete: bool,
}

/// Gastown configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GastownConfig {
    /// Known rigs
    #[serde(default)]
    pub rigs: Vec<Rig>,

    /// Swarm settings
    #[serde(default)]
    pub swarm: SwarmConfig,
}

impl GastownConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::GastownError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading Gastown configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            rigs = config.rigs.len(),
            strict_delete = config.swarm.strict_delete,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load from `path`, or the default path; a missing file yields an empty config
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::new())
        }
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving Gastown configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/gastown/config.yaml)
    pub fn default_path() -> PathBuf {
        // Always use ~/.config for consistency across platforms (macOS, Linux)
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("gastown");
        path.push("config.yaml");
        path
    }

    /// Get a rig by name
    pub fn get_rig(&self, name: &str) -> Option<&Rig> {
        self.rigs.iter().find(|r| r.name == name)
    }

    /// Add a rig, replacing any rig with the same name
    pub fn add_rig(&mut self, rig: Rig) {
        match self.rigs.iter_mut().find(|r| r.name == rig.name) {
            Some(existing) => *existing = rig,
            None => self.rigs.push(rig),
        }
    }

    /// Remove a rig by name
    pub fn remove_rig(&mut self, name: &str) -> Option<Rig> {
        let index = self.rigs.iter().position(|r| r.name == name)?;
        Some(self.rigs.remove(index))
    }

    /// Get all rig names
    pub fn rig_names(&self) -> Vec<&str> {
        self.rigs.iter().map(|r| r.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    fn rig(name: &str) -> Rig {
        Rig::builder()
            .name(name)
            .path(format!("/rigs/{}", name))
            .git_url(format!("https://github.com/example/{}.git", name))
            .build()
            .unwrap()
    }

    #[test]
    fn test_config_creation() {
        let config = GastownConfig::new();
        assert!(config.rigs.is_empty());
        assert!(!config.swarm.strict_delete);
    }

    #[test]
    fn test_add_get_remove_rig() {
        let mut config = GastownConfig::new();
        config.add_rig(rig("gastown"));
        config.add_rig(rig("beads"));

        assert_eq!(config.rig_names(), vec!["gastown", "beads"]);
        assert!(config.get_rig("gastown").is_some());
        assert!(config.get_rig("missing").is_none());

        let removed = config.remove_rig("gastown");
        assert!(removed.is_some());
        assert_eq!(config.rig_names(), vec!["beads"]);
        assert!(config.remove_rig("gastown").is_none());
    }

    #[test]
    fn test_add_rig_replaces_same_name() {
        let mut config = GastownConfig::new();
        config.add_rig(rig("gastown"));

        let mut moved = rig("gastown");
        moved.path = PathBuf::from("/elsewhere/gastown");
        config.add_rig(moved);

        assert_eq!(config.rigs.len(), 1);
        assert_eq!(config.rigs[0].path, PathBuf::from("/elsewhere/gastown"));
    }

    #[test]
    fn test_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        let mut config = GastownConfig::new();
        config.add_rig(rig("gastown"));
        config.swarm.strict_delete = true;
        config.save(path).unwrap();

        let loaded = GastownConfig::load(path).unwrap();
        assert_eq!(loaded.rigs, config.rigs);
        assert!(loaded.swarm.strict_delete);
    }

    #[test]
    fn test_load_minimal_yaml() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(
            temp_file.path(),
            "rigs:\n  - name: gastown\n    path: /rigs/gastown\n    git_url: git@github.com:example/gastown.git\n",
        )
        .unwrap();

        let config = GastownConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.rig_names(), vec!["gastown"]);
        assert_eq!(config.swarm, SwarmConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let result = GastownConfig::load("/nonexistent/config.yaml");
        assert!(matches!(result, Err(crate::GastownError::Config(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("none.yaml");
        let config = GastownConfig::load_or_default(Some(missing.as_path())).unwrap();
        assert!(config.rigs.is_empty());
    }

    #[test]
    fn test_default_path() {
        let path = GastownConfig::default_path();
        assert!(path.ends_with("gastown/config.yaml"));
    }
}
