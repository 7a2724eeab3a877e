//! Policy-governed fetcher
//!
//! Each fetch runs a linear gate chain before touching the target resource:
//!
//! 1. Terms gate: the URL's host must be permitted by the source's terms policy
//! 2. Robots gate: the source's robots checker must allow the URL
//! 3. Rate gate: the sliding-window limiter must admit the request
//!
//! A request that passes all gates enters the attempt loop:
//!
//! | Outcome | Action |
//! |---------|--------|
//! | Status < 400 | Success, returned immediately |
//! | HTTP 5xx | Retry with backoff while attempts remain |
//! | Other HTTP >= 400 | Rejected immediately |
//! | Transport error | Retry with backoff while attempts remain |
//! | Cancellation | Rejected immediately |
//!
//! Every failure is recorded in the metrics, logged, and written to the
//! optional failure sink. Only an unknown source name surfaces as an error.

use crate::config::Config;
use crate::fetch::{FetchOutcome, FetchResult, HttpClient, Rejection, ReqwestHttpClient};
use crate::metrics::{FailureSink, FileFailureLogger, MetricsRecorder};
use crate::policy::SourcePolicy;
use crate::robots::{RobotsComplianceChecker, DEFAULT_ROBOTS_TIMEOUT};
use crate::state::RateLimiter;
use crate::url::{extract_domain, parse_http_url};
use crate::{PaperclipError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Timeout for a single primary request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Orchestrates policy gates, rate limiting and retries for many sources
///
/// A `Fetcher` is meant to be shared (`Arc<Fetcher>`) by many concurrent
/// callers. Its limiter, metrics and robots caches are internally synchronized.
pub struct Fetcher {
    policies: HashMap<String, SourcePolicy>,
    client: Arc<dyn HttpClient>,
    rate_limiter: Arc<RateLimiter>,
    metrics: Arc<MetricsRecorder>,
    failure_logger: Option<Arc<dyn FailureSink>>,
    robots_checkers: Mutex<HashMap<String, Arc<RobotsComplianceChecker>>>,
    request_timeout: Duration,
    robots_timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher backed by a fresh reqwest client
    ///
    /// # Arguments
    ///
    /// * `policies` - Source policies keyed by source name
    ///
    /// # Returns
    ///
    /// * `Ok(Fetcher)` - Fetcher with a default limiter and empty metrics
    /// * `Err(PaperclipError)` - The HTTP client could not be built
    pub fn new(policies: HashMap<String, SourcePolicy>) -> Result<Self> {
        Ok(Self::with_client(policies, Arc::new(ReqwestHttpClient::new()?)))
    }

    /// Creates a fetcher that issues requests through `client`
    pub fn with_client(
        policies: HashMap<String, SourcePolicy>,
        client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            policies,
            client,
            rate_limiter: Arc::new(RateLimiter::default()),
            metrics: Arc::new(MetricsRecorder::new()),
            failure_logger: None,
            robots_checkers: Mutex::new(HashMap::new()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            robots_timeout: DEFAULT_ROBOTS_TIMEOUT,
        }
    }

    /// Creates a fetcher from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut fetcher = Self::new(config.source_policies())?
            .with_rate_limiter(Arc::new(RateLimiter::with_window_seconds(
                config.fetcher.rate_window_seconds,
            )))
            .with_request_timeout(Duration::from_secs(config.fetcher.request_timeout_seconds))
            .with_robots_timeout(Duration::from_secs(config.fetcher.robots_timeout_seconds));

        if let Some(path) = &config.fetcher.failure_log_path {
            let logger = FileFailureLogger::new(path);
            tracing::info!("Appending failure reasons to {}", logger.path().display());
            fetcher = fetcher.with_failure_logger(Arc::new(logger));
        }

        Ok(fetcher)
    }

    /// Shares an existing limiter, e.g. across several fetchers
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Records into an existing metrics recorder
    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_failure_logger(mut self, failure_logger: Arc<dyn FailureSink>) -> Self {
        self.failure_logger = Some(failure_logger);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_robots_timeout(mut self, timeout: Duration) -> Self {
        self.robots_timeout = timeout;
        self
    }

    /// Live handle to the metrics recorder
    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        Arc::clone(&self.metrics)
    }

    /// Returns the policy registered under `source`
    pub fn policy(&self, source: &str) -> Option<&SourcePolicy> {
        self.policies.get(source)
    }

    /// Names of all configured sources
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    /// Fetches `url` under the policy of `source`
    ///
    /// # Returns
    ///
    /// * `Ok(FetchOutcome::Fetched)` - A response with status below 400
    /// * `Ok(FetchOutcome::Rejected)` - A gate refused or every attempt failed
    /// * `Err(PaperclipError::UnknownSource)` - `source` is not configured
    pub async fn fetch(&self, url: &str, source: &str) -> Result<FetchOutcome> {
        self.fetch_with_cancel(url, source, &CancellationToken::new()).await
    }

    /// Fetches `url` under the policy of `source`, aborting on `cancel`
    ///
    /// Cancellation is observed during the robots lookup, while a request is in
    /// flight and during backoff sleeps. A cancelled fetch is rejected with
    /// [`Rejection::Cancelled`] and never retried.
    pub async fn fetch_with_cancel(
        &self,
        url: &str,
        source: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome> {
        let policy = self
            .policies
            .get(source)
            .ok_or_else(|| PaperclipError::UnknownSource(source.to_string()))?;

        if cancel.is_cancelled() {
            return Ok(self.reject(Rejection::Cancelled {
                url: url.to_string(),
            }));
        }

        let target = parse_http_url(url);

        // Terms gate
        let domain = target
            .as_ref()
            .ok()
            .and_then(extract_domain)
            .unwrap_or_default();
        if !policy.terms_policy.is_domain_allowed(&domain) {
            return Ok(self.reject(Rejection::PolicyViolation { domain }));
        }

        // Robots gate
        let checker = self.robots_checker(source, policy);
        let robots_allowed = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Ok(self.reject(Rejection::Cancelled { url: url.to_string() }));
            }
            allowed = checker.is_allowed(url) => allowed,
        };
        if !robots_allowed {
            return Ok(self.reject(Rejection::RobotsDisallowed {
                url: url.to_string(),
            }));
        }

        // Rate gate
        let decision = self
            .rate_limiter
            .check(source, policy.rate_limit_per_minute);
        if !decision.allowed {
            return Ok(self.reject(Rejection::RateLimited {
                source_name: source.to_string(),
                retry_after: decision.retry_after.unwrap_or_default(),
            }));
        }

        tracing::debug!("All gates passed for {} ({})", url, source);

        let target = match target {
            Ok(target) => target,
            Err(e) => {
                return Ok(self.reject(Rejection::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }));
            }
        };

        let retry = &policy.retry_policy;
        let max_attempts = retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!("Attempt {}/{} for {}", attempt, max_attempts, url);

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Ok(self.reject(Rejection::Cancelled { url: url.to_string() }));
                }
                response = self.client.get(&target, &policy.user_agent, self.request_timeout) => {
                    response
                }
            };

            let rejection = match response {
                Ok(response) if response.status < 400 => {
                    self.metrics.record_success();
                    return Ok(FetchOutcome::Fetched(FetchResult {
                        url: url.to_string(),
                        status_code: response.status,
                        content: response.body,
                    }));
                }
                Ok(response) if (500..600).contains(&response.status) => Rejection::ServerError {
                    status: response.status,
                    url: url.to_string(),
                },
                Ok(response) => Rejection::HttpStatus {
                    status: response.status,
                    url: url.to_string(),
                },
                Err(e) => Rejection::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                },
            };

            self.record_failure(&rejection);
            if !rejection.is_retriable() || !retry.has_attempts_left(attempt) {
                return Ok(FetchOutcome::Rejected(rejection));
            }

            self.metrics.record_retry();
            let backoff = retry.backoff_for_attempt(attempt);
            tracing::debug!("Backing off {:?} before retrying {}", backoff, url);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Ok(self.reject(Rejection::Cancelled { url: url.to_string() }));
                }
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }

    /// Returns the robots checker for `source`, creating it on first use
    fn robots_checker(&self, source: &str, policy: &SourcePolicy) -> Arc<RobotsComplianceChecker> {
        let mut checkers = self
            .robots_checkers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let checker = checkers.entry(source.to_string()).or_insert_with(|| {
            Arc::new(RobotsComplianceChecker::with_timeout(
                policy.user_agent.clone(),
                Arc::clone(&self.client),
                self.robots_timeout,
            ))
        });
        Arc::clone(checker)
    }

    fn reject(&self, rejection: Rejection) -> FetchOutcome {
        self.record_failure(&rejection);
        FetchOutcome::Rejected(rejection)
    }

    fn record_failure(&self, rejection: &Rejection) {
        let reason = rejection.to_string();
        tracing::warn!("{}", reason);

        if let Some(sink) = &self.failure_logger {
            if let Err(e) = sink.log(&reason) {
                tracing::warn!("Failed to write failure log: {}", e);
            }
        }

        self.metrics.record_failure(rejection.kind(), reason);
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("sources", &self.policies.keys().collect::<Vec<_>>())
            .field("rate_limiter", &self.rate_limiter)
            .field("request_timeout", &self.request_timeout)
            .field("robots_timeout", &self.robots_timeout)
            .finish()
    }
}
