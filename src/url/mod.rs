//! URL handling module for Sumi-Scribe
//!
//! This module provides target normalization, URL normalization for
//! deduplication, same-site checks used to keep discovery on one host, and
//! the include/exclude patterns applied to discovered pages.

mod domain;
mod matcher;
mod normalize;
mod target;

// Re-export main functions
pub use domain::{extract_domain, same_site};
pub use matcher::UrlFilter;
pub use normalize::{is_excluded_asset, normalize_url};
pub use target::Target;
