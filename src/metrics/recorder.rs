//! Fetch outcome counters and failure history

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};

/// Category of a recorded failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Domain prohibited by the source's terms policy
    PolicyViolation,
    /// robots.txt forbids the path for the source's user agent
    RobotsDisallowed,
    /// Sliding-window admission denied
    RateLimited,
    /// HTTP 5xx response
    ServerError,
    /// Any other HTTP error status
    HttpStatus,
    /// DNS, connection, timeout or body read failure
    Transport,
    /// The caller cancelled the fetch
    Cancelled,
}

/// One entry of the failure log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub at: DateTime<Utc>,
    pub kind: FailureKind,
    pub reason: String,
}

/// Point-in-time copy of the recorder's counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub successes: u64,
    pub failures: u64,
    pub retries: u64,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub last_failure_reason: Option<String>,
    pub last_failure_kind: Option<FailureKind>,
}

#[derive(Debug, Default)]
struct MetricsState {
    counters: MetricsSnapshot,
    failure_log: Vec<FailureRecord>,
}

/// Shared fetch metrics
///
/// All updates go through one lock, so a snapshot never observes a failure
/// count without its matching last-failure fields. The failure log grows for
/// the lifetime of the recorder unless [`clear_failure_log`] is called.
///
/// [`clear_failure_log`]: MetricsRecorder::clear_failure_log
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    state: Mutex<MetricsState>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.lock().counters.successes += 1;
    }

    pub fn record_retry(&self) {
        self.lock().counters.retries += 1;
    }

    /// Records a failure; the last-failure fields are overwritten
    pub fn record_failure(&self, kind: FailureKind, reason: impl Into<String>) {
        let reason = reason.into();
        let at = Utc::now();

        let mut state = self.lock();
        state.counters.failures += 1;
        state.counters.last_failure_at = Some(at);
        state.counters.last_failure_reason = Some(reason.clone());
        state.counters.last_failure_kind = Some(kind);
        state.failure_log.push(FailureRecord { at, kind, reason });
    }

    /// Returns an immutable copy of the counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.lock().counters.clone()
    }

    /// Returns a copy of every failure recorded since creation or the last clear
    pub fn failure_log(&self) -> Vec<FailureRecord> {
        self.lock().failure_log.clone()
    }

    /// Discards the failure log; counters are kept
    pub fn clear_failure_log(&self) {
        self.lock().failure_log.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MetricsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
