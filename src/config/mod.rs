//! Configuration system
//!
//! Loads ~/.config/gastown/config.yaml with support for:
//! - Multiple rigs, each with a local root and a clone URL
//! - Swarm settings such as strict deletion

mod gastown_config;
pub mod validation;

pub use gastown_config::{GastownConfig, SwarmConfig};
pub use validation::{validate_config, validate_config_result, ValidationError};
