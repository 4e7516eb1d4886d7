use serde::Deserialize;

/// Main configuration structure for Sumi-Scribe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages to fetch in one run
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link depth followed by the fallback crawl
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of concurrent page fetches
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Minimum time between request starts to the same host (milliseconds)
    #[serde(rename = "rate-limit-ms")]
    pub rate_limit_ms: u64,

    /// Wall-clock budget for the whole run (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Timeout for a single HTTP request (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Retries for transient failures (timeouts, 5xx, 429)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// How many levels of sitemap indexes are expanded
    #[serde(rename = "max-sitemap-depth")]
    pub max_sitemap_depth: u32,

    /// Skip URLs disallowed by robots.txt
    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,

    /// When non-empty, a page URL must contain at least one of these
    #[serde(rename = "include-patterns")]
    pub include_patterns: Vec<String>,

    /// A page URL containing any of these is skipped
    #[serde(rename = "exclude-patterns")]
    pub exclude_patterns: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_depth: 3,
            max_concurrent_fetches: 5,
            rate_limit_ms: 1000,
            timeout_ms: 300_000,
            request_timeout_ms: 30_000,
            max_retries: 2,
            retry_backoff_ms: 500,
            max_sitemap_depth: 3,
            respect_robots: true,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiScribe".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://llmstxt.org/".to_string(),
            contact_email: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the artifacts are written to when the request names none
    pub directory: String,

    /// Keep the raw HTML of each page in the full and JSON artifacts
    #[serde(rename = "include-raw-html")]
    pub include_raw_html: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            include_raw_html: false,
        }
    }
}

/// Content extraction tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Descriptions longer than this are cut at a word boundary
    #[serde(rename = "max-description-chars")]
    pub max_description_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_description_chars: 200,
        }
    }
}

/// Site metadata placed at the top of the generated documents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site name; defaults to the host or directory name
    pub name: Option<String>,

    /// One-line site description
    pub description: Option<String>,
}
