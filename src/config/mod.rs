//! Configuration module for Forge-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use forge_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Records go to: {}", config.output.records_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, OutputConfig, PageConfig, ScraperConfig, DEFAULT_API_TIMEOUT_SECS,
    DEFAULT_WAIT_TIMEOUT_MS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
