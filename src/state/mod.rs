//! Per-run data model
//!
//! # Components
//!
//! - `CrawlCandidate`: a URL chosen for fetching, with how it was discovered
//! - `PageRecord`: the outcome for one candidate, extracted or failed
//!
//! Nothing here outlives a run; every generation starts from scratch.

mod candidate;
mod record;

// Re-export main types
pub use candidate::{CrawlCandidate, DiscoverySource};
pub use record::{PageRecord, PageStatus};
