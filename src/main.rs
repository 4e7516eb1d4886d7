//! Sumi-Scribe main entry point
//!
//! This is the command-line interface for the Sumi-Scribe llms.txt generator.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use sumi_scribe::config::{load_config_with_hash, Config};
use sumi_scribe::output::print_report;
use sumi_scribe::{GenerateOptions, GenerateRequest, Generator};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sumi-Scribe: a polite llms.txt generator
///
/// Sumi-Scribe reads a documentation site (or a local documentation tree)
/// while respecting robots.txt and rate limits, and writes `llms.txt`,
/// `llms-full.txt` and `documentation_data.json`.
#[derive(Parser, Debug)]
#[command(name = "sumi-scribe")]
#[command(version)]
#[command(about = "Generate llms.txt files for documentation sites", long_about = None)]
struct Cli {
    /// URL, bare domain, @domain, file:// URL or local path
    #[arg(value_name = "TARGET")]
    target: String,

    /// Directory for the generated files (default: config output.directory)
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages to include
    #[arg(long)]
    max_pages: Option<usize>,

    /// Maximum link depth for the fallback crawl
    #[arg(long)]
    max_depth: Option<u32>,

    /// Minimum milliseconds between requests to the same host
    #[arg(long)]
    rate_limit_ms: Option<u64>,

    /// Overall time budget for the run in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Only include page URLs containing this substring (repeatable)
    #[arg(long = "include-pattern", value_name = "PATTERN")]
    include_patterns: Vec<String>,

    /// Skip page URLs containing this substring (repeatable)
    #[arg(long = "exclude-pattern", value_name = "PATTERN")]
    exclude_patterns: Vec<String>,

    /// Site name for the llms.txt header
    #[arg(long)]
    name: Option<String>,

    /// Site description for the llms.txt header
    #[arg(long)]
    description: Option<String>,

    /// Append each page's raw HTML to llms-full.txt
    #[arg(long)]
    include_raw_html: bool,

    /// Discover pages and print them without fetching their content
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> GenerateOptions {
        GenerateOptions {
            max_pages: self.max_pages,
            max_depth: self.max_depth,
            rate_limit_ms: self.rate_limit_ms,
            timeout_ms: self.timeout_ms,
        }
    }

    fn request(&self) -> GenerateRequest {
        let request = GenerateRequest::new(&self.target).with_options(self.options());
        match &self.output_dir {
            Some(dir) => request.with_output_directory(dir),
            None => request,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(&cli)?;
    if cli.name.is_some() {
        config.site.name = cli.name.clone();
    }
    if cli.description.is_some() {
        config.site.description = cli.description.clone();
    }
    if cli.include_raw_html {
        config.output.include_raw_html = true;
    }
    if !cli.include_patterns.is_empty() {
        config.crawler.include_patterns = cli.include_patterns.clone();
    }
    if !cli.exclude_patterns.is_empty() {
        config.crawler.exclude_patterns = cli.exclude_patterns.clone();
    }

    let cancel = CancellationToken::new();
    let generator = Generator::new(config).with_cancellation(cancel.clone());
    let request = cli.request();

    if cli.dry_run {
        return handle_dry_run(&generator, &request).await;
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the pages fetched so far");
            cancel.cancel();
        }
    });

    let result = generator.generate(request).await;
    if !cli.quiet {
        print_report(&result);
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

/// Loads the config file if one was given, otherwise the defaults
fn load_configuration(cli: &Cli) -> Result<Config> {
    let Some(path) = &cli.config else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scribe=info,warn"),
            1 => EnvFilter::new("sumi_scribe=debug,info"),
            2 => EnvFilter::new("sumi_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be fetched
async fn handle_dry_run(generator: &Generator, request: &GenerateRequest) -> Result<()> {
    let config = generator.effective_config(request)?;

    println!("=== Sumi-Scribe Dry Run ===\n");

    println!("Target: {}", request.target);
    println!("\nCrawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Rate limit: {}ms", config.crawler.rate_limit_ms);
    println!("  Run budget: {}ms", config.crawler.timeout_ms);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    if !config.crawler.include_patterns.is_empty() {
        println!("  Include patterns: {:?}", config.crawler.include_patterns);
    }
    if !config.crawler.exclude_patterns.is_empty() {
        println!("  Exclude patterns: {:?}", config.crawler.exclude_patterns);
    }

    let resolution = generator
        .discover(request)
        .await
        .context("Could not resolve target")?;

    println!("\nDiscovered Pages ({}):", resolution.candidates.len());
    for candidate in &resolution.candidates {
        println!("  - {} [{}]", candidate.url, candidate.source);
    }

    if !resolution.robots.sitemaps().is_empty() {
        println!("\nSitemaps announced in robots.txt:");
        for sitemap in resolution.robots.sitemaps() {
            println!("  * {}", sitemap);
        }
    }

    println!("\n✓ Would generate llms.txt from {} pages", resolution.candidates.len());
    Ok(())
}
