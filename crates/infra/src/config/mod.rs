//! Configuration loading and management
//!
//! This module provides utilities for loading application configuration
//! from environment variables and files, and for persisting it.

pub mod loader;

// Re-export commonly used items
pub use loader::{
    apply_env_overrides, load, load_from_file, load_or_init, probe_config_paths, save_to_file,
};
