//! Bounded-concurrency fetching under a run budget
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - The run-wide wall-clock deadline
//! - Cancellation through a shared token
//!
//! Per-host spacing is enforced by the fetcher's rate limiter, so a fetch
//! needs both a semaphore permit and a host slot before it starts.

use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use crate::state::CrawlCandidate;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Deadline and cancellation shared by every network operation of a run
#[derive(Debug, Clone)]
pub struct RunBudget {
    deadline: Instant,
    cancel: CancellationToken,
}

impl RunBudget {
    /// A budget that expires `timeout` from now
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            cancel,
        }
    }

    /// The error a new operation would get, if the budget is already spent
    pub fn exhausted(&self) -> Option<FetchError> {
        if self.cancel.is_cancelled() {
            Some(FetchError::Cancelled)
        } else if Instant::now() >= self.deadline {
            Some(FetchError::RunTimedOut)
        } else {
            None
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs `work` unless the run is cancelled or out of time first
    ///
    /// Work still in flight when either happens is dropped.
    pub async fn run<T, F>(&self, work: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        if let Some(error) = self.exhausted() {
            return Err(error);
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            _ = tokio::time::sleep_until(self.deadline) => Err(FetchError::RunTimedOut),
            result = work => result,
        }
    }
}

/// Fetch outcome paired with the candidate it belongs to
pub type FetchOutcome = (CrawlCandidate, Result<FetchedPage, FetchError>);

/// Fetches candidates concurrently
pub struct Scheduler {
    fetcher: Fetcher,
    permits: Arc<Semaphore>,
    budget: RunBudget,
}

impl Scheduler {
    /// Creates a scheduler allowing `max_concurrent` fetches at once
    pub fn new(fetcher: Fetcher, max_concurrent: usize, budget: RunBudget) -> Self {
        Self {
            fetcher,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            budget,
        }
    }

    /// Fetches every candidate and returns outcomes in candidate order
    ///
    /// Candidates not started before the deadline, or still in flight at it,
    /// fail with `RunTimedOut`; after cancellation they fail with `Cancelled`.
    pub async fn fetch_all(&self, candidates: Vec<CrawlCandidate>) -> Vec<FetchOutcome> {
        if candidates.is_empty() {
            return Vec::new();
        }
        tracing::info!("Fetching {} pages", candidates.len());

        let mut handles = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let fetcher = self.fetcher.clone();
            let permits = Arc::clone(&self.permits);
            let budget = self.budget.clone();
            let url = candidate.url.clone();

            let handle = tokio::spawn(async move {
                budget
                    .run(async {
                        let _permit = permits
                            .acquire_owned()
                            .await
                            .map_err(|_| FetchError::Cancelled)?;
                        fetcher.fetch(&url).await
                    })
                    .await
            });
            handles.push((candidate, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (candidate, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(FetchError::Cancelled),
                Err(e) => Err(FetchError::Io(format!("fetch task failed: {}", e))),
            };

            match &result {
                Ok(page) => tracing::debug!("Fetched {} ({})", candidate.url, page.status),
                Err(e) => tracing::warn!("Failed to fetch {}: {}", candidate.url, e.reason()),
            }
            outcomes.push((candidate, result));
        }

        outcomes
    }
}
