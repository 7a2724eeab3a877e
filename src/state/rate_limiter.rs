//! Sliding-window rate limiting keyed by source name

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Default trailing window for rate limiting
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Outcome of a single admission check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitDecision {
    /// Whether the request was admitted (and recorded)
    pub allowed: bool,

    /// How long until a slot frees up; only present when denied
    pub retry_after: Option<Duration>,
}

impl RateLimitDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            retry_after: None,
        }
    }

    fn deny(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after: Some(retry_after),
        }
    }

    /// The retry-after hint in fractional seconds
    pub fn retry_after_seconds(&self) -> Option<f64> {
        self.retry_after.map(|d| d.as_secs_f64())
    }
}

/// Sliding-window rate limiter keyed by source name
///
/// For each key the limiter keeps the monotonic timestamps of admitted
/// requests inside the trailing window. A check evicts expired timestamps,
/// then either denies (window full) or records `now` and admits. Eviction and
/// append happen under one lock so two concurrent callers can never both take
/// the last slot.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    events: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Creates a limiter with the given trailing window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            events: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a limiter whose window is `seconds` long
    pub fn with_window_seconds(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    /// Returns the configured window length
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Checks and, if admitted, records a request for `key` at the current time
    pub fn check(&self, key: &str, limit: u32) -> RateLimitDecision {
        self.check_at(key, limit, Instant::now())
    }

    /// Checks and, if admitted, records a request for `key` at `now`
    ///
    /// # Arguments
    ///
    /// * `key` - The source name the limit applies to
    /// * `limit` - Maximum admitted requests per window
    /// * `now` - The current monotonic time
    ///
    /// # Returns
    ///
    /// An admitted decision, or a denial carrying the time until the oldest
    /// recorded request leaves the window (never negative). A zero limit
    /// denies every request with a full window as the hint.
    pub fn check_at(&self, key: &str, limit: u32, now: Instant) -> RateLimitDecision {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let timestamps = events.entry(key.to_string()).or_default();

        while let Some(&oldest) = timestamps.front() {
            if now.saturating_duration_since(oldest) > self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= limit as usize {
            let retry_after = match timestamps.front() {
                Some(&oldest) => self
                    .window
                    .saturating_sub(now.saturating_duration_since(oldest)),
                None => self.window,
            };
            tracing::trace!(
                "Rate limit hit for {}: {} in window, retry after {:?}",
                key,
                timestamps.len(),
                retry_after
            );
            return RateLimitDecision::deny(retry_after);
        }

        timestamps.push_back(now);
        RateLimitDecision::allow()
    }

    /// Number of admitted requests currently tracked for `key`
    ///
    /// Expired timestamps are only evicted by checks, so this may include
    /// entries that have already left the window.
    pub fn tracked_requests(&self, key: &str) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map_or(0, VecDeque::len)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
