//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - Validation of calibration knobs and safety floors

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
