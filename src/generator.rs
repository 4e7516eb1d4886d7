//! Pipeline orchestration
//!
//! resolve → fetch → extract → aggregate → render → write
//!
//! `Generator::generate` never returns an error: run-level problems (bad
//! target, unwritable output directory) come back as a `GenerationResult`
//! with `success = false`, and per-page problems become entries in
//! `failures`.

use crate::aggregate::{aggregate, Aggregation, Duplicate, Failure, Section};
use crate::config::{validate, Config};
use crate::crawler::{
    FetchError, FetchedPage, Fetcher, Resolution, ResolveSettings, Resolver, RunBudget, Scheduler,
};
use crate::extract::Extractor;
use crate::output::{write_artifacts, SiteInfo};
use crate::robots::ParsedRobots;
use crate::state::{CrawlCandidate, PageRecord};
use crate::url::Target;
use crate::ScribeError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

pub use crate::output::OutputPaths;

/// Per-run overrides of the crawler settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    pub max_pages: Option<usize>,
    pub max_depth: Option<u32>,
    pub rate_limit_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl GenerateOptions {
    fn apply(&self, config: &mut Config) {
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = max_pages;
        }
        if let Some(max_depth) = self.max_depth {
            config.crawler.max_depth = max_depth;
        }
        if let Some(rate_limit_ms) = self.rate_limit_ms {
            config.crawler.rate_limit_ms = rate_limit_ms;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.crawler.timeout_ms = timeout_ms;
        }
    }
}

/// What to generate and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// URL, bare domain, `@domain`, `file://` URL or filesystem path
    pub target: String,
    /// Defaults to the configured output directory
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
    #[serde(default)]
    pub options: Option<GenerateOptions>,
}

impl GenerateRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            output_directory: None,
            options: None,
        }
    }

    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(directory.into());
        self
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Summary of one run, handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Pages that made it into sections
    pub page_count: usize,
    pub sections: Vec<Section>,
    pub failures: Vec<Failure>,
    pub duplicates: Vec<Duplicate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_paths: Option<OutputPaths>,
    pub generated_at: String,
}

impl GenerationResult {
    /// A run that stopped before producing any pages
    pub fn failure(error: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            page_count: 0,
            sections: Vec::new(),
            failures: Vec::new(),
            duplicates: Vec::new(),
            output_paths: None,
            generated_at: timestamp(generated_at),
        }
    }

    fn completed(aggregation: Aggregation, generated_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            error: None,
            page_count: aggregation.page_count(),
            sections: aggregation.sections,
            failures: aggregation.failures,
            duplicates: aggregation.duplicates,
            output_paths: None,
            generated_at: timestamp(generated_at),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Runs the generation pipeline with a fixed base configuration
#[derive(Debug, Clone)]
pub struct Generator {
    config: Config,
    cancel: CancellationToken,
    generated_at: Option<DateTime<Utc>>,
}

impl Generator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
            generated_at: None,
        }
    }

    /// Uses `token` to stop the run early
    ///
    /// After cancellation no new fetch starts; pages not yet fetched are
    /// recorded as `cancelled` and the artifacts are still written.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Pins the timestamp stamped into the artifacts
    pub fn with_timestamp(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    /// The base configuration with `request`'s overrides applied and validated
    pub fn effective_config(&self, request: &GenerateRequest) -> Result<Config, ScribeError> {
        let mut config = self.config.clone();
        if let Some(options) = &request.options {
            options.apply(&mut config);
        }
        validate(&config)?;
        Ok(config)
    }

    /// Generates the artifacts for `request`
    pub async fn generate(&self, request: GenerateRequest) -> GenerationResult {
        let generated_at = self.generated_at.unwrap_or_else(Utc::now);
        tracing::info!("Generating llms.txt for {}", request.target);

        match self.run(&request, generated_at).await {
            Ok(result) => {
                tracing::info!(
                    "Generation finished: {} pages, {} failures, success = {}",
                    result.page_count,
                    result.failures.len(),
                    result.success
                );
                result
            }
            Err(e) => {
                tracing::error!("Generation failed: {}", e);
                GenerationResult::failure(e.to_string(), generated_at)
            }
        }
    }

    /// Resolves the target without fetching page content
    pub async fn discover(&self, request: &GenerateRequest) -> Result<Resolution, ScribeError> {
        let config = self.effective_config(request)?;
        let target = Target::parse(&request.target)?;
        let (resolver, _) = self.crawl_parts(&config)?;
        resolver.resolve(&target).await
    }

    fn crawl_parts(&self, config: &Config) -> Result<(Resolver, Scheduler), ScribeError> {
        let fetcher = Fetcher::new(config)?;
        let budget = RunBudget::new(
            Duration::from_millis(config.crawler.timeout_ms),
            self.cancel.clone(),
        );
        let resolver = Resolver::new(
            fetcher.clone(),
            ResolveSettings::from_config(config),
            budget.clone(),
        );
        let scheduler = Scheduler::new(
            fetcher,
            config.crawler.max_concurrent_fetches as usize,
            budget,
        );
        Ok((resolver, scheduler))
    }

    async fn run(
        &self,
        request: &GenerateRequest,
        generated_at: DateTime<Utc>,
    ) -> Result<GenerationResult, ScribeError> {
        let config = self.effective_config(request)?;
        let target = Target::parse(&request.target)?;
        let root = target.root_url()?;
        let (resolver, scheduler) = self.crawl_parts(&config)?;

        let resolution = resolver.resolve(&target).await?;
        tracing::info!("Resolved {} candidates", resolution.candidates.len());

        let records = collect_records(&config, resolution, &scheduler).await;
        let aggregation = aggregate(records, &root);

        let site = site_info(&config, &target, &root, generated_at);
        let directory = request
            .output_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.directory));
        let written = write_artifacts(&directory, &site, &aggregation);

        let mut result = GenerationResult::completed(aggregation, generated_at);
        match written {
            Ok(paths) => result.output_paths = Some(paths),
            Err(e) => {
                tracing::error!("{}", e);
                result.success = false;
                result.error = Some(e.to_string());
            }
        }
        Ok(result)
    }
}

/// Fetches what discovery has not already fetched and extracts every page,
/// keeping candidate order
async fn collect_records(
    config: &Config,
    resolution: Resolution,
    scheduler: &Scheduler,
) -> Vec<PageRecord> {
    let Resolution {
        candidates,
        mut prefetched,
        robots,
    } = resolution;

    let mut known: Vec<Option<Result<FetchedPage, FetchError>>> =
        Vec::with_capacity(candidates.len());
    let mut pending = Vec::new();
    for candidate in &candidates {
        if !robots_allow(config, &robots, &candidate.url) {
            tracing::debug!("robots.txt disallows {}", candidate.url);
            known.push(Some(Err(FetchError::RobotsDisallowed)));
        } else if let Some(outcome) = prefetched.remove(&candidate.url) {
            known.push(Some(outcome));
        } else {
            known.push(None);
            pending.push(candidate.clone());
        }
    }

    let mut fetched = scheduler.fetch_all(pending).await.into_iter();
    let extractor = Extractor::new(config);

    candidates
        .iter()
        .zip(known)
        .map(|(candidate, outcome)| {
            let outcome = outcome
                .or_else(|| fetched.next().map(|(_, result)| result))
                .unwrap_or(Err(FetchError::Cancelled));
            to_record(&extractor, candidate, outcome)
        })
        .collect()
}

fn robots_allow(config: &Config, robots: &ParsedRobots, url: &Url) -> bool {
    !config.crawler.respect_robots
        || url.scheme() == "file"
        || robots.is_allowed(url.as_str(), &config.user_agent.crawler_name)
}

fn to_record(
    extractor: &Extractor,
    candidate: &CrawlCandidate,
    outcome: Result<FetchedPage, FetchError>,
) -> PageRecord {
    match outcome {
        Ok(page) => extractor.extract(candidate, &page),
        Err(e) => PageRecord::failed(candidate.url.as_str(), candidate.source, e.reason()),
    }
}

fn site_info(config: &Config, target: &Target, root: &Url, generated_at: DateTime<Utc>) -> SiteInfo {
    SiteInfo {
        name: config
            .site
            .name
            .clone()
            .unwrap_or_else(|| target.site_name()),
        description: config
            .site
            .description
            .clone()
            .unwrap_or_else(|| format!("Documentation generated from {}", target)),
        root: root.to_string(),
        generated_at,
    }
}

/// Runs one generation with `config`
///
/// # Example
///
/// ```no_run
/// use sumi_scribe::{generate, Config, GenerateRequest};
///
/// # async fn run() {
/// let request = GenerateRequest::new("./docs").with_output_directory("out");
/// let result = generate(Config::default(), request).await;
/// assert!(result.success);
/// # }
/// ```
pub async fn generate(config: Config, request: GenerateRequest) -> GenerationResult {
    Generator::new(config).generate(request).await
}
