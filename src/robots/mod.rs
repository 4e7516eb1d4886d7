//! Robots.txt handling module
//!
//! Parses robots.txt into allow/deny rules, a per-agent `Crawl-delay` and the
//! `Sitemap:` directives used to seed discovery. Fetching happens through the
//! crawler's fetcher so robots.txt requests are rate limited like any other.

mod parser;

pub use parser::ParsedRobots;
