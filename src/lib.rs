//! Sumi-Scribe: a polite llms.txt generator
//!
//! This crate turns a documentation website (or a local documentation tree)
//! into the llmstxt.org artifacts: `llms.txt`, `llms-full.txt` and a JSON
//! mirror. Pages are discovered from sitemaps or a bounded same-site crawl,
//! fetched with per-host rate limiting, cleaned into plain text, deduplicated,
//! grouped into sections and rendered deterministically.
//!
//! # Example
//!
//! ```no_run
//! use sumi_scribe::{generate, Config, GenerateRequest};
//!
//! # async fn run() {
//! let request = GenerateRequest::new("docs.example.com");
//! let result = generate(Config::default(), request).await;
//! println!("{} pages, success = {}", result.page_count, result.success);
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod generator;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Run-level error type for Sumi-Scribe operations
///
/// Per-page problems never surface here; they become failed page records.
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not resolve target {target}: {reason}")]
    TargetResolution { target: String, reason: String },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Sumi-Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use generator::{
    generate, GenerateOptions, GenerateRequest, GenerationResult, Generator, OutputPaths,
};
pub use state::{PageRecord, PageStatus};
pub use url::{normalize_url, Target};
