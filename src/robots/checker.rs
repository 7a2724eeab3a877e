//! Cached robots.txt lookups for a single user agent

use crate::fetch::HttpClient;
use crate::robots::ParsedRobots;
use crate::url::{parse_http_url, robots_cache_key, robots_url};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Timeout for a single robots.txt request
pub const DEFAULT_ROBOTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-host cached robots.txt evaluator for one user agent
///
/// Rulesets are cached by URL authority and never refreshed. Concurrent first
/// lookups of the same host may both fetch robots.txt; the first ruleset
/// stored wins and the cache is never held locked across a request.
pub struct RobotsComplianceChecker {
    user_agent: String,
    client: Arc<dyn HttpClient>,
    timeout: Duration,
    cache: RwLock<HashMap<String, Arc<ParsedRobots>>>,
}

impl RobotsComplianceChecker {
    pub fn new(user_agent: impl Into<String>, client: Arc<dyn HttpClient>) -> Self {
        Self::with_timeout(user_agent, client, DEFAULT_ROBOTS_TIMEOUT)
    }

    pub fn with_timeout(
        user_agent: impl Into<String>,
        client: Arc<dyn HttpClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            client,
            timeout,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of hosts with a cached ruleset
    pub fn cached_hosts(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Checks whether this checker's user agent may fetch `url`
    ///
    /// URLs without a scheme or host are denied. The first query for a host
    /// fetches and caches its robots.txt; any failure to obtain it caches an
    /// allow-all ruleset instead.
    pub async fn is_allowed(&self, url: &str) -> bool {
        let parsed = match parse_http_url(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Denying {}: {}", url, e);
                return false;
            }
        };

        let Some(key) = robots_cache_key(&parsed) else {
            return false;
        };

        let robots = match self.cached(&key) {
            Some(robots) => {
                tracing::trace!("robots.txt cache hit for {}", key);
                robots
            }
            None => {
                let fetched = self.fetch_robots(&parsed).await;
                let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
                Arc::clone(cache.entry(key).or_insert_with(|| Arc::new(fetched)))
            }
        };

        robots.is_allowed(parsed.as_str(), &self.user_agent)
    }

    fn cached(&self, key: &str) -> Option<Arc<ParsedRobots>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    async fn fetch_robots(&self, url: &url::Url) -> ParsedRobots {
        let location = match robots_url(url) {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!("Cannot derive robots.txt location for {}: {}", url, e);
                return ParsedRobots::allow_all();
            }
        };

        tracing::debug!("Fetching {}", location);
        match self
            .client
            .get(&location, &self.user_agent, self.timeout)
            .await
        {
            Ok(response) if response.status < 400 => ParsedRobots::from_bytes(&response.body),
            Ok(response) => {
                tracing::warn!(
                    "Failed to load robots.txt from {}: HTTP {}, allowing all",
                    location,
                    response.status
                );
                ParsedRobots::allow_all()
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load robots.txt from {}: {}, allowing all",
                    location,
                    e
                );
                ParsedRobots::allow_all()
            }
        }
    }
}

impl std::fmt::Debug for RobotsComplianceChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotsComplianceChecker")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("cached_hosts", &self.cached_hosts())
            .finish()
    }
}
