//! Configuration module for Gifgrab
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so the file itself is optional.
//!
//! # Example
//!
//! ```no_run
//! use gifgrab::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gifgrab.toml")).unwrap();
//! println!("Release delay: {}ms", config.downloader.release_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DownloaderConfig, FilterConfig, PathsConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
