use crate::config::CrawlerConfig;

/// Include/exclude substring patterns applied to page URLs
///
/// Matching is a plain, case-sensitive substring test:
/// 1. A URL containing any exclude pattern is rejected
/// 2. With include patterns set, a URL must contain at least one of them
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::UrlFilter;
///
/// let filter = UrlFilter::new(vec!["/docs/".into()], vec!["/docs/old/".into()]);
/// assert!(filter.allows("https://example.com/docs/intro"));
/// assert!(!filter.allows("https://example.com/docs/old/intro"));
/// assert!(!filter.allows("https://example.com/blog/post"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl UrlFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.include_patterns.clone(),
            config.exclude_patterns.clone(),
        )
    }

    pub fn allows(&self, url: &str) -> bool {
        if self.exclude.iter().any(|p| url.contains(p.as_str())) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| url.contains(p.as_str()))
    }
}
