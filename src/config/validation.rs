//! Configuration validation
//!
//! Validates Gastown configuration for correctness:
//! - No duplicate or empty rig names
//! - Rig paths are absolute
//! - Clone URLs look like Git URLs

use super::gastown_config::GastownConfig;
use crate::rig::Rig;
use crate::GastownError;
use std::collections::HashSet;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub rig: Option<String>,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rig: None,
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_rig(mut self, rig: impl Into<String>) -> Self {
        self.rig = Some(rig.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref rig) = self.rig {
            write!(f, "[{}] {}: {}", rig, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a Gastown configuration
pub fn validate_config(config: &GastownConfig) -> ValidationResult {
    let mut errors = Vec::new();

    let mut seen_names = HashSet::new();
    for rig in &config.rigs {
        if !seen_names.insert(rig.name.as_str()) {
            errors.push(ValidationError::new(
                "rigs",
                format!("Duplicate rig name: {}", rig.name),
            ));
        }
    }

    for rig in &config.rigs {
        if let Err(mut rig_errors) = validate_rig(rig) {
            errors.append(&mut rig_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single rig entry
fn validate_rig(rig: &Rig) -> ValidationResult {
    let mut errors = Vec::new();

    if rig.name.trim().is_empty() {
        errors.push(ValidationError::new("name", "Rig name cannot be empty").with_rig(&rig.name));
    }

    if !rig.path.is_absolute() {
        errors.push(
            ValidationError::new(
                "path",
                format!("Rig path must be absolute: {}", rig.path.display()),
            )
            .with_rig(&rig.name),
        );
    }

    if rig.git_url.trim().is_empty() {
        errors.push(ValidationError::new("git_url", "Clone URL cannot be empty").with_rig(&rig.name));
    } else if !is_valid_git_url(&rig.git_url) {
        errors.push(
            ValidationError::new(
                "git_url",
                format!("Invalid Git URL format: {}", rig.git_url),
            )
            .with_rig(&rig.name),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check if a string is a valid Git URL
fn is_valid_git_url(url: &str) -> bool {
    // SSH format: git@github.com:user/repo.git
    if url.starts_with("git@") && url.contains(':') {
        return true;
    }

    if url.starts_with("https://")
        || url.starts_with("http://")
        || url.starts_with("ssh://")
        || url.starts_with("file://")
    {
        return true;
    }

    // Local path: /path/to/repo or ~/path/to/repo
    if url.starts_with('/') || url.starts_with("~/") {
        return true;
    }

    false
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &GastownConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        GastownError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
