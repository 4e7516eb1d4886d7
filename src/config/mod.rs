//! Configuration module for Sumi-Scribe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so a run without a configuration file uses
//! [`Config::default`].
//!
//! # Example
//!
//! ```no_run
//! use sumi_scribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scribe.toml")).unwrap();
//! println!("Will fetch at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, ExtractionConfig, OutputConfig, SiteConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
