//! Configuration module for Paperclip
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files that describe the fetcher settings and the per-source policies.
//!
//! # Example
//!
//! ```no_run
//! use paperclip::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("paperclip.toml")).unwrap();
//! println!("Configured sources: {}", config.sources.len());
//! ```

mod defaults;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig};

pub use defaults::default_sources;
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
