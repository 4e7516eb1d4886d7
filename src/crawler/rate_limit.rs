//! Per-host request spacing
//!
//! Every outgoing request reserves a start slot for its host. Slots for the
//! same host are at least the host interval apart, where the interval is the
//! larger of the configured rate limit and the host's robots.txt
//! `Crawl-delay`. A 429 response pushes the host's next slot further out.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Longest a 429 response can push back a host's next slot
pub const MAX_PENALTY: Duration = Duration::from_secs(300);

/// Source of the current time
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// The real monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Spacing state for one host
#[derive(Debug, Clone, Default)]
struct HostSlot {
    /// Earliest start of the next request
    next_slot: Option<Instant>,
    /// Interval override from robots.txt, if larger than the default
    crawl_delay: Option<Duration>,
}

/// Shared per-host rate limiter
///
/// This is the only mutable state shared between fetch tasks; the host table
/// sits behind a mutex that is never held across an await.
#[derive(Debug)]
pub struct HostRateLimiter<C: Clock = SystemClock> {
    default_interval: Duration,
    hosts: Mutex<HashMap<String, HostSlot>>,
    clock: C,
}

impl HostRateLimiter<SystemClock> {
    /// Creates a limiter on the system clock
    pub fn new(default_interval: Duration) -> Self {
        Self::with_clock(default_interval, SystemClock)
    }
}

impl<C: Clock> HostRateLimiter<C> {
    /// Creates a limiter that reads time from `clock`
    pub fn with_clock(default_interval: Duration, clock: C) -> Self {
        Self {
            default_interval,
            hosts: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, HostSlot>> {
        // a panic while holding the lock cannot leave the table inconsistent
        self.hosts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserves the next start slot for `host` and returns how long the
    /// caller must wait before starting its request
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use sumi_scribe::crawler::HostRateLimiter;
    ///
    /// let limiter = HostRateLimiter::new(Duration::from_millis(200));
    /// assert_eq!(limiter.reserve("example.com"), Duration::ZERO);
    /// assert!(limiter.reserve("example.com") > Duration::from_millis(150));
    /// ```
    pub fn reserve(&self, host: &str) -> Duration {
        let now = self.clock.now();
        let mut table = self.table();
        let slot = table.entry(host.to_string()).or_default();

        let start = match slot.next_slot {
            Some(next) if next > now => next,
            _ => now,
        };
        let interval = self
            .default_interval
            .max(slot.crawl_delay.unwrap_or(Duration::ZERO));

        let next = start
            .checked_add(interval)
            .or_else(|| start.checked_add(MAX_PENALTY))
            .unwrap_or(start);
        slot.next_slot = Some(next);

        start.saturating_duration_since(now)
    }

    /// Applies a robots.txt `Crawl-delay` to `host`
    ///
    /// Delays shorter than the configured interval have no effect.
    pub fn set_crawl_delay(&self, host: &str, delay: Duration) {
        let mut table = self.table();
        let slot = table.entry(host.to_string()).or_default();
        slot.crawl_delay = Some(delay);
    }

    /// Pushes the next slot for `host` at least `delay` into the future
    ///
    /// Used when the host answers 429 Too Many Requests. The push is capped
    /// at [`MAX_PENALTY`].
    pub fn penalize(&self, host: &str, delay: Duration) {
        let now = self.clock.now();
        let mut table = self.table();
        let slot = table.entry(host.to_string()).or_default();
        let Some(earliest) = now.checked_add(delay.min(MAX_PENALTY)) else {
            return;
        };
        if slot.next_slot.map_or(true, |next| next < earliest) {
            slot.next_slot = Some(earliest);
        }
    }

    /// Effective spacing between request starts for `host`
    pub fn interval_for(&self, host: &str) -> Duration {
        let delay = self
            .table()
            .get(host)
            .and_then(|slot| slot.crawl_delay)
            .unwrap_or(Duration::ZERO);
        self.default_interval.max(delay)
    }
}
