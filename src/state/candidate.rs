use serde::Serialize;
use std::fmt;
use url::Url;

/// How a candidate URL was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    /// The target root itself
    Root,
    /// Listed in a sitemap
    Sitemap,
    /// Reached by following links from the root
    LinkCrawl,
    /// Enumerated from a local directory
    LocalFile,
}

impl DiscoverySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Sitemap => "sitemap",
            Self::LinkCrawl => "link_crawl",
            Self::LocalFile => "local_file",
        }
    }
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL selected for fetching
///
/// Candidates are unique per run by normalized URL; the resolver enforces
/// this before handing them on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlCandidate {
    pub url: Url,
    pub source: DiscoverySource,
    /// Link distance from the root (0 for sitemap and local entries)
    pub depth: u32,
}

impl CrawlCandidate {
    pub fn new(url: Url, source: DiscoverySource, depth: u32) -> Self {
        Self { url, source, depth }
    }
}
