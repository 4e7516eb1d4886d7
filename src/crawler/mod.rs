//! Discovery and fetching
//!
//! - `resolver`: turns a target into crawl candidates (robots.txt, sitemaps,
//!   link-crawl fallback, local directory walk)
//! - `fetcher`: HTTP and `file://` retrieval with retries
//! - `rate_limit`: per-host request spacing shared by all fetches
//! - `scheduler`: bounded-concurrency fetching under the run budget
//! - `sitemap`: sitemap XML parsing

mod fetcher;
mod rate_limit;
mod resolver;
mod scheduler;
mod sitemap;

pub use fetcher::{
    build_http_client, content_type_for_extension, read_local, user_agent_string, FetchError,
    FetchedPage, Fetcher,
};
pub use rate_limit::{Clock, HostRateLimiter, SystemClock};
pub use resolver::{Resolution, ResolveSettings, Resolver, DOC_EXTENSIONS};
pub use scheduler::{FetchOutcome, RunBudget, Scheduler};
pub use sitemap::{parse_sitemap, SitemapDocument};
