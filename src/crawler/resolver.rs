//! Page discovery
//!
//! # Remote targets
//!
//! 1. Fetch `/robots.txt`; apply its `Crawl-delay` and collect `Sitemap:` lines
//! 2. Read those sitemaps, or else `/sitemap.xml` then `/sitemap_index.xml`
//! 3. Expand sitemap indexes up to the configured depth, skipping repeats
//! 4. Keep same-site http(s) document URLs, normalized and deduplicated
//! 5. With no sitemap URLs, crawl links breadth-first from the root
//!
//! # Local targets
//!
//! A file is its own single candidate; a directory is walked in sorted order
//! for documentation files.

use crate::config::Config;
use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use crate::crawler::scheduler::RunBudget;
use crate::crawler::sitemap::{parse_sitemap, SitemapDocument};
use crate::extract::{HtmlDocument, ScraperDocument};
use crate::robots::ParsedRobots;
use crate::state::{CrawlCandidate, DiscoverySource};
use crate::url::{extract_domain, is_excluded_asset, normalize_url, same_site, Target, UrlFilter};
use crate::ScribeError;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Sitemap locations tried when robots.txt names none
const CONVENTIONAL_SITEMAPS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml"];

/// File extensions read from local documentation trees
pub const DOC_EXTENSIONS: &[&str] = &["md", "markdown", "mdx", "txt", "rst", "html", "htm"];

/// Directories never entered when walking a local tree
const SKIP_DIRS: &[&str] = &["node_modules", "target", "__pycache__", "venv"];

/// Discovery limits
#[derive(Debug, Clone)]
pub struct ResolveSettings {
    pub max_pages: usize,
    pub max_depth: u32,
    pub max_sitemap_depth: u32,
    pub respect_robots: bool,
    /// Product token matched against robots.txt `User-agent` lines
    pub robots_agent: String,
    /// Include/exclude patterns for page URLs
    pub filter: UrlFilter,
}

impl ResolveSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_pages: config.crawler.max_pages,
            max_depth: config.crawler.max_depth,
            max_sitemap_depth: config.crawler.max_sitemap_depth,
            respect_robots: config.crawler.respect_robots,
            robots_agent: config.user_agent.crawler_name.clone(),
            filter: UrlFilter::from_config(&config.crawler),
        }
    }
}

/// What discovery produced
#[derive(Debug)]
pub struct Resolution {
    /// Candidates in discovery order, unique by normalized URL
    pub candidates: Vec<CrawlCandidate>,
    /// Outcomes already fetched during the link crawl, keyed by candidate URL
    pub prefetched: HashMap<Url, Result<FetchedPage, FetchError>>,
    /// The site's robots.txt rules (allow-all for local targets)
    pub robots: ParsedRobots,
}

impl Resolution {
    fn new(candidates: Vec<CrawlCandidate>, robots: ParsedRobots) -> Self {
        Self {
            candidates,
            prefetched: HashMap::new(),
            robots,
        }
    }
}

/// Turns a target into crawl candidates
pub struct Resolver {
    fetcher: Fetcher,
    settings: ResolveSettings,
    budget: RunBudget,
}

impl Resolver {
    pub fn new(fetcher: Fetcher, settings: ResolveSettings, budget: RunBudget) -> Self {
        Self {
            fetcher,
            settings,
            budget,
        }
    }

    /// Discovers the pages of `target`
    ///
    /// # Errors
    ///
    /// `TargetResolution` when a local path is missing or holds no documents,
    /// or when a remote site without a usable sitemap cannot serve its root.
    pub async fn resolve(&self, target: &Target) -> Result<Resolution, ScribeError> {
        match target {
            Target::Remote(root) => self.resolve_remote(root).await,
            Target::Local(path) => {
                let path = path.clone();
                let max_pages = self.settings.max_pages;
                let filter = self.settings.filter.clone();
                tokio::task::spawn_blocking(move || resolve_local(&path, max_pages, &filter))
                    .await
                    .map_err(|e| ScribeError::Io(std::io::Error::other(e)))?
            }
        }
    }

    async fn resolve_remote(&self, root: &Url) -> Result<Resolution, ScribeError> {
        let robots = self.fetch_robots(root).await;

        let candidates = self.sitemap_candidates(root, &robots).await;
        if !candidates.is_empty() {
            tracing::info!("Sitemaps listed {} pages for {}", candidates.len(), root);
            return Ok(Resolution::new(candidates, robots));
        }

        tracing::info!("No usable sitemap for {}, following links instead", root);
        self.link_crawl(root, robots).await
    }

    async fn fetch_robots(&self, root: &Url) -> ParsedRobots {
        let Ok(robots_url) = root.join("/robots.txt") else {
            return ParsedRobots::allow_all();
        };

        let robots = match self.budget.run(self.fetcher.fetch(&robots_url)).await {
            Ok(page) => ParsedRobots::from_content(&page.body),
            Err(e) => {
                tracing::debug!("No robots.txt at {}: {}", robots_url, e.reason());
                ParsedRobots::allow_all()
            }
        };

        if let (Some(seconds), Some(host)) = (
            robots.crawl_delay(&self.settings.robots_agent),
            extract_domain(root),
        ) {
            match Duration::try_from_secs_f64(seconds) {
                Ok(delay) => {
                    tracing::info!("Honoring Crawl-delay of {}s for {}", seconds, host);
                    self.fetcher.limiter().set_crawl_delay(&host, delay);
                }
                Err(e) => tracing::warn!("Ignoring Crawl-delay {} for {}: {}", seconds, host, e),
            }
        }

        robots
    }

    async fn sitemap_candidates(&self, root: &Url, robots: &ParsedRobots) -> Vec<CrawlCandidate> {
        let announced: Vec<Url> = robots
            .sitemaps()
            .iter()
            .filter_map(|s| root.join(s).ok())
            .collect();

        if !announced.is_empty() {
            return self.expand_sitemaps(root, announced).await;
        }

        for path in CONVENTIONAL_SITEMAPS {
            let Ok(sitemap) = root.join(path) else { continue };
            let candidates = self.expand_sitemaps(root, vec![sitemap]).await;
            if !candidates.is_empty() {
                return candidates;
            }
        }

        Vec::new()
    }

    /// Reads sitemaps breadth-first, expanding indexes up to the depth cap
    async fn expand_sitemaps(&self, root: &Url, start: Vec<Url>) -> Vec<CrawlCandidate> {
        let mut queue: VecDeque<(Url, u32)> = start.into_iter().map(|u| (u, 0)).collect();
        let mut visited_sitemaps: HashSet<String> = HashSet::new();
        let mut seen_pages: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();

        while let Some((sitemap_url, depth)) = queue.pop_front() {
            if candidates.len() >= self.settings.max_pages {
                break;
            }
            if !visited_sitemaps.insert(sitemap_url.as_str().to_string()) {
                continue;
            }
            if sitemap_url.path().ends_with(".gz") {
                tracing::warn!("Skipping compressed sitemap {}", sitemap_url);
                continue;
            }

            let page = match self.budget.run(self.fetcher.fetch(&sitemap_url)).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::debug!("Sitemap {} unavailable: {}", sitemap_url, e.reason());
                    continue;
                }
            };

            match parse_sitemap(&page.body) {
                Some(SitemapDocument::Index(children)) => {
                    if depth + 1 > self.settings.max_sitemap_depth {
                        tracing::warn!("Sitemap index {} exceeds nesting limit", sitemap_url);
                        continue;
                    }
                    for child in children {
                        if let Ok(child_url) = page.final_url.join(&child) {
                            queue.push_back((child_url, depth + 1));
                        }
                    }
                }
                Some(SitemapDocument::UrlSet(locations)) => {
                    tracing::debug!("Sitemap {} lists {} URLs", sitemap_url, locations.len());
                    for location in locations {
                        if candidates.len() >= self.settings.max_pages {
                            break;
                        }
                        let Some(url) = accept_page_url(root, &location, &self.settings.filter)
                        else {
                            continue;
                        };
                        if seen_pages.insert(url.as_str().to_string()) {
                            candidates.push(CrawlCandidate::new(url, DiscoverySource::Sitemap, 0));
                        }
                    }
                }
                None => tracing::debug!("{} is not a sitemap", sitemap_url),
            }
        }

        candidates
    }

    /// Breadth-first same-site crawl from the root
    ///
    /// Every fetched page becomes a candidate and its outcome is kept so the
    /// scheduler does not fetch it again.
    async fn link_crawl(
        &self,
        root: &Url,
        robots: ParsedRobots,
    ) -> Result<Resolution, ScribeError> {
        let start = normalize_url(root.as_str())?;
        if !self.allowed(&robots, &start) {
            return Err(ScribeError::TargetResolution {
                target: root.to_string(),
                reason: FetchError::RobotsDisallowed.to_string(),
            });
        }
        let mut site = start.clone();

        let mut frontier: VecDeque<(Url, u32)> = VecDeque::from([(start.clone(), 0)]);
        let mut visited: HashSet<String> = HashSet::from([start.as_str().to_string()]);
        let mut resolution = Resolution::new(Vec::new(), robots);

        while let Some((url, depth)) = frontier.pop_front() {
            let source = if depth == 0 {
                DiscoverySource::Root
            } else {
                DiscoverySource::LinkCrawl
            };

            let outcome = self.budget.run(self.fetcher.fetch(&url)).await;

            if depth == 0 {
                match &outcome {
                    Ok(page) => site = page.final_url.clone(),
                    Err(e) => {
                        return Err(ScribeError::TargetResolution {
                            target: root.to_string(),
                            reason: e.to_string(),
                        })
                    }
                }
            }

            if let Ok(page) = &outcome {
                if depth < self.settings.max_depth && looks_like_html(page) {
                    for link in page_links(page) {
                        if visited.len() >= self.settings.max_pages {
                            break;
                        }
                        let Some(link) =
                            accept_page_url(&site, link.as_str(), &self.settings.filter)
                        else {
                            continue;
                        };
                        if !self.allowed(&resolution.robots, &link) {
                            continue;
                        }
                        if visited.insert(link.as_str().to_string()) {
                            frontier.push_back((link, depth + 1));
                        }
                    }
                }
            }

            // the root is always read for links but listed only if it passes the filter
            if depth > 0 || self.settings.filter.allows(url.as_str()) {
                resolution
                    .candidates
                    .push(CrawlCandidate::new(url.clone(), source, depth));
                resolution.prefetched.insert(url, outcome);
            }
        }

        tracing::info!(
            "Link crawl from {} found {} pages",
            root,
            resolution.candidates.len()
        );
        Ok(resolution)
    }

    fn allowed(&self, robots: &ParsedRobots, url: &Url) -> bool {
        !self.settings.respect_robots || robots.is_allowed(url.as_str(), &self.settings.robots_agent)
    }
}

/// Parses, filters and normalizes a discovered page URL
fn accept_page_url(site: &Url, raw: &str, filter: &UrlFilter) -> Option<Url> {
    let parsed = site.join(raw.trim()).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    if !same_site(site, &parsed) || is_excluded_asset(&parsed) {
        return None;
    }
    let url = normalize_url(parsed.as_str()).ok()?;
    filter.allows(url.as_str()).then_some(url)
}

fn looks_like_html(page: &FetchedPage) -> bool {
    let content_type = page.content_type.to_ascii_lowercase();
    content_type.contains("html")
        || (content_type.is_empty() && page.body.trim_start().starts_with('<'))
}

fn page_links(page: &FetchedPage) -> Vec<Url> {
    ScraperDocument::parse(&page.body).links(&page.final_url)
}

/// Enumerates a local file or directory
///
/// A single file is always taken; files found by walking a directory must
/// pass `filter` on their `file://` URL.
fn resolve_local(
    path: &Path,
    max_pages: usize,
    filter: &UrlFilter,
) -> Result<Resolution, ScribeError> {
    let unresolved = |reason: &str| ScribeError::TargetResolution {
        target: path.display().to_string(),
        reason: reason.to_string(),
    };

    if !path.exists() {
        return Err(unresolved("path does not exist"));
    }

    let files: Vec<Url> = if path.is_file() {
        Url::from_file_path(path).into_iter().collect()
    } else {
        walk_documents(path)
            .iter()
            .filter_map(|file| Url::from_file_path(file).ok())
            .filter(|url| filter.allows(url.as_str()))
            .take(max_pages)
            .collect()
    };

    if files.is_empty() {
        return Err(unresolved("no documentation files found"));
    }

    let candidates = files
        .into_iter()
        .map(|url| CrawlCandidate::new(url, DiscoverySource::LocalFile, 0))
        .collect::<Vec<_>>();

    tracing::info!(
        "Found {} documentation files under {}",
        candidates.len(),
        path.display()
    );
    Ok(Resolution::new(candidates, ParsedRobots::allow_all()))
}

fn is_doc_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| DOC_EXTENSIONS.contains(&e.as_str()))
}

/// Documentation files below `root`, sorted, hidden entries skipped
fn walk_documents(root: &Path) -> Vec<PathBuf> {
    jwalk::WalkDir::new(root)
        .sort(true)
        .skip_hidden(true)
        .follow_links(false)
        .process_read_dir(|_depth, _path, _state, entries| {
            entries.retain(|entry| match entry {
                Ok(entry) if entry.file_type().is_dir() => entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| !SKIP_DIRS.contains(&name)),
                _ => true,
            });
        })
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(entry.path()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|path| is_doc_file(path))
        .collect()
}
