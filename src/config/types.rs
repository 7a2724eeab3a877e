use crate::policy::SourcePolicy;
use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure for Paperclip
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,

    #[serde(rename = "source", default)]
    pub sources: Vec<SourcePolicy>,
}

impl Config {
    /// Builds a configuration from a set of source policies and default settings
    pub fn from_sources(sources: Vec<SourcePolicy>) -> Self {
        Self {
            fetcher: FetcherConfig::default(),
            sources,
        }
    }

    /// Returns the source policies keyed by name
    pub fn source_policies(&self) -> HashMap<String, SourcePolicy> {
        self.sources
            .iter()
            .map(|policy| (policy.name.clone(), policy.clone()))
            .collect()
    }
}

/// Fetcher-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FetcherConfig {
    /// Trailing window of the rate limiter (seconds)
    #[serde(rename = "rate-window-seconds", default = "default_rate_window")]
    pub rate_window_seconds: u64,

    /// Timeout for a single primary request (seconds)
    #[serde(rename = "request-timeout-seconds", default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Timeout for a robots.txt request (seconds)
    #[serde(rename = "robots-timeout-seconds", default = "default_robots_timeout")]
    pub robots_timeout_seconds: u64,

    /// Append failure reasons to this file, if set
    #[serde(rename = "failure-log-path", default)]
    pub failure_log_path: Option<String>,
}

fn default_rate_window() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    15
}

fn default_robots_timeout() -> u64 {
    10
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            rate_window_seconds: default_rate_window(),
            request_timeout_seconds: default_request_timeout(),
            robots_timeout_seconds: default_robots_timeout(),
            failure_log_path: None,
        }
    }
}
