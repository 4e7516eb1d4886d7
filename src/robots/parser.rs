//! Robots.txt parser implementation
//!
//! Allow/deny decisions are delegated to the robotstxt crate; `Crawl-delay`
//! and `Sitemap:` are extensions it does not expose, so they are read in a
//! single pass over the directives when the file is loaded.

use robotstxt::DefaultMatcher;

/// A `Crawl-delay` together with the user-agent group it belongs to
#[derive(Debug, Clone)]
struct DelayGroup {
    agents: Vec<String>,
    seconds: f64,
}

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    delays: Vec<DelayGroup>,
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        let (delays, sitemaps) = scan_directives(content);
        Self {
            content: content.to_string(),
            delays,
            sitemaps,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            delays: Vec::new(),
            sitemaps: Vec::new(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL or path (e.g., "/page.html")
    /// * `user_agent` - The product token of the crawler, e.g. "SumiScribe"
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay in seconds for a specific user agent
    ///
    /// A group naming the agent wins over the `*` group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let agent = user_agent.to_lowercase();

        let specific = self.delays.iter().rev().find(|group| {
            group
                .agents
                .iter()
                .any(|ua| ua != "*" && agent.contains(ua.as_str()))
        });
        let wildcard = self
            .delays
            .iter()
            .rev()
            .find(|group| group.agents.iter().any(|ua| ua == "*"));

        specific.or(wildcard).map(|group| group.seconds)
    }

    /// Sitemap URLs announced with `Sitemap:` lines, in file order
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }
}

/// Longest `Crawl-delay` honored, in seconds
const MAX_CRAWL_DELAY_SECS: f64 = 60.0;

/// Reads `Crawl-delay` groups and `Sitemap:` lines
///
/// Consecutive `User-agent` lines form one group; any other rule closes the
/// agent list so the next `User-agent` starts a new group.
fn scan_directives(content: &str) -> (Vec<DelayGroup>, Vec<String>) {
    let mut delays = Vec::new();
    let mut sitemaps = Vec::new();
    let mut agents: Vec<String> = Vec::new();
    let mut in_agent_lines = false;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_lowercase().as_str() {
            "user-agent" => {
                if !in_agent_lines {
                    agents.clear();
                }
                agents.push(value.to_lowercase());
                in_agent_lines = true;
            }
            "crawl-delay" => {
                in_agent_lines = false;
                if let Ok(seconds) = value.parse::<f64>() {
                    if seconds.is_finite() && seconds >= 0.0 && !agents.is_empty() {
                        delays.push(DelayGroup {
                            agents: agents.clone(),
                            seconds: seconds.min(MAX_CRAWL_DELAY_SECS),
                        });
                    }
                }
            }
            "sitemap" => {
                // not tied to any group
                if !value.is_empty() {
                    sitemaps.push(value.to_string());
                }
            }
            _ => in_agent_lines = false,
        }
    }

    (delays, sitemaps)
}
