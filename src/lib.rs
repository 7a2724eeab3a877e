//! Paperclip: a polite, policy-governed fetch pipeline
//!
//! This crate retrieves remote resources on behalf of ingestion clients while
//! respecting per-source rate limits, robots.txt directives and terms-of-use
//! domain restrictions. The [`fetch::Fetcher`] is the single operational entry
//! point; everything it decides is recorded in a [`metrics::MetricsRecorder`].

pub mod config;
pub mod fetch;
pub mod metrics;
pub mod policy;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Paperclip operations
///
/// Ordinary fetch failures are never surfaced through this type; they become a
/// [`fetch::Rejection`] instead. Only programmer and setup errors end up here.
#[derive(Debug, Error)]
pub enum PaperclipError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing scheme in URL")]
    MissingScheme,

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Paperclip operations
pub type Result<T> = std::result::Result<T, PaperclipError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use fetch::{FetchOutcome, FetchResult, Fetcher, Rejection};
pub use metrics::{MetricsRecorder, MetricsSnapshot};
pub use policy::{RetryPolicy, SourcePolicy, TermsPolicy};
pub use robots::RobotsComplianceChecker;
pub use state::{RateLimitDecision, RateLimiter};
