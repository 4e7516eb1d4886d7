//! HTTP and local-file fetcher
//!
//! This module retrieves the raw content for one URL:
//! - Building the HTTP client with the crawler's user agent string
//! - Reserving a per-host rate-limit slot before every request, retries included
//! - Retrying transient failures with exponential backoff
//! - Reading `file://` URLs straight from disk
//! - Classifying failures into stable reason strings

use crate::config::{Config, UserAgentConfig};
use crate::crawler::rate_limit::{HostRateLimiter, MAX_PENALTY};
use crate::url::extract_domain;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Raw content retrieved for a URL
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: Url,
    /// URL after redirects
    pub final_url: Url,
    /// HTTP status code (200 for local files)
    pub status: u16,
    /// Content-Type header value, or a type guessed from the file extension
    pub content_type: String,
    /// Decoded body
    pub body: String,
}

/// Why a URL could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("run budget exhausted before the page was fetched")]
    RunTimedOut,

    #[error("run was cancelled")]
    Cancelled,

    #[error("disallowed by robots.txt")]
    RobotsDisallowed,
}

impl FetchError {
    /// Stable failure reason recorded in the generated artifacts
    ///
    /// | Error | Reason |
    /// |-------|--------|
    /// | Timeout | `timeout` |
    /// | HttpStatus(404) | `http_404` |
    /// | Connection | `connection_error` |
    /// | Io | `io_error` |
    /// | RunTimedOut | `timed out` |
    /// | Cancelled | `cancelled` |
    /// | RobotsDisallowed | `robots_disallowed` |
    pub fn reason(&self) -> String {
        match self {
            FetchError::Timeout => "timeout".to_string(),
            FetchError::HttpStatus(code) => format!("http_{}", code),
            FetchError::Connection(_) => "connection_error".to_string(),
            FetchError::Io(_) => "io_error".to_string(),
            FetchError::RunTimedOut => "timed out".to_string(),
            FetchError::Cancelled => "cancelled".to_string(),
            FetchError::RobotsDisallowed => "robots_disallowed".to_string(),
        }
    }
}

/// A failed attempt plus what the retry loop needs to know about it
#[derive(Debug)]
struct Attempt {
    error: FetchError,
    transient: bool,
    retry_after: Option<Duration>,
}

impl Attempt {
    fn permanent(error: FetchError) -> Self {
        Self {
            error,
            transient: false,
            retry_after: None,
        }
    }

    fn transient(error: FetchError) -> Self {
        Self {
            error,
            transient: true,
            retry_after: None,
        }
    }
}

/// Formats the User-Agent header value
///
/// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`, with the email
/// part omitted when none is configured.
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    match &config.contact_email {
        Some(email) => format!(
            "{}/{} (+{}; {})",
            config.crawler_name, config.crawler_version, config.contact_url, email
        ),
        None => format!(
            "{}/{} (+{})",
            config.crawler_name, config.crawler_version, config.contact_url
        ),
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_scribe::config::UserAgentConfig;
/// use sumi_scribe::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(request_timeout)
        .connect_timeout(request_timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches URLs through a shared client and rate limiter
///
/// Cloning is cheap; clones share the client connection pool and the
/// per-host slot table.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    limiter: Arc<HostRateLimiter>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl Fetcher {
    /// Creates a fetcher from the crawler and user-agent settings
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_millis(config.crawler.request_timeout_ms),
        )?;
        let limiter = Arc::new(HostRateLimiter::new(Duration::from_millis(
            config.crawler.rate_limit_ms,
        )));
        Ok(Self::with_parts(
            client,
            limiter,
            config.crawler.max_retries,
            Duration::from_millis(config.crawler.retry_backoff_ms),
        ))
    }

    /// Creates a fetcher from prebuilt parts
    pub fn with_parts(
        client: Client,
        limiter: Arc<HostRateLimiter>,
        max_retries: u32,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            client,
            limiter,
            max_retries,
            retry_backoff,
        }
    }

    /// The per-host limiter used by this fetcher
    pub fn limiter(&self) -> &Arc<HostRateLimiter> {
        &self.limiter
    }

    /// Fetches a URL
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Success |
    /// | HTTP 429 | Retry, next slot pushed back by `Retry-After` |
    /// | HTTP 5xx | Retry with exponential backoff |
    /// | Other HTTP 4xx | Immediate → `http_<code>` |
    /// | Timeout | Retry with exponential backoff |
    /// | Body read interrupted | Retry with exponential backoff |
    /// | Connection refused / DNS | Immediate → `connection_error` |
    /// | Missing local file | Immediate → `http_404` |
    ///
    /// Cancellation and the run deadline are applied by the caller.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        if url.scheme() == "file" {
            return read_local(url).await;
        }

        let host = extract_domain(url).unwrap_or_default();
        let mut attempt: u32 = 0;

        loop {
            let wait = self.limiter.reserve(&host);
            if !wait.is_zero() {
                tracing::trace!("Waiting {:?} for a slot on {}", wait, host);
                tokio::time::sleep(wait).await;
            }

            let failure = match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(failure) => failure,
            };

            if let Some(delay) = failure.retry_after {
                self.limiter.penalize(&host, delay);
            }

            if !failure.transient || attempt >= self.max_retries {
                tracing::debug!("Giving up on {}: {}", url, failure.error);
                return Err(failure.error);
            }

            let backoff = self.retry_backoff.saturating_mul(2u32.saturating_pow(attempt));
            tracing::warn!(
                "Attempt {} for {} failed ({}), retrying in {:?}",
                attempt + 1,
                url,
                failure.error,
                backoff
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<FetchedPage, Attempt> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, &response));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                Attempt::transient(FetchError::Timeout)
            } else {
                Attempt::transient(FetchError::Connection(e.to_string()))
            }
        })?;

        Ok(FetchedPage {
            url: url.clone(),
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn classify_send_error(error: reqwest::Error) -> Attempt {
    if error.is_timeout() {
        Attempt::transient(FetchError::Timeout)
    } else if error.is_connect() {
        Attempt::permanent(FetchError::Connection(error.to_string()))
    } else if let Some(status) = error.status() {
        Attempt::permanent(FetchError::HttpStatus(status.as_u16()))
    } else {
        Attempt::permanent(FetchError::Connection(error.to_string()))
    }
}

fn classify_status(status: StatusCode, response: &reqwest::Response) -> Attempt {
    let error = FetchError::HttpStatus(status.as_u16());

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs).min(MAX_PENALTY));
        return Attempt {
            error,
            transient: true,
            retry_after,
        };
    }

    if status.is_server_error() {
        Attempt::transient(error)
    } else {
        Attempt::permanent(error)
    }
}

/// Reads a `file://` URL from disk
///
/// Local reads bypass the rate limiter. A missing file is reported as
/// `HttpStatus(404)` so it reads like any other dead link.
pub async fn read_local(url: &Url) -> Result<FetchedPage, FetchError> {
    let path = url
        .to_file_path()
        .map_err(|_| FetchError::Io(format!("not a local path: {}", url)))?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FetchError::HttpStatus(404),
        _ => FetchError::Io(e.to_string()),
    })?;

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    Ok(FetchedPage {
        url: url.clone(),
        final_url: url.clone(),
        status: 200,
        content_type: content_type_for_extension(&extension).to_string(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Guesses a content type from a local file extension
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension {
        "html" | "htm" | "xhtml" => "text/html",
        "md" | "markdown" | "mdx" => "text/markdown",
        "rst" => "text/x-rst",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
