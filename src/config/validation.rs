use crate::config::types::{Config, FetcherConfig};
use crate::policy::{RetryPolicy, SourcePolicy, TermsPolicy};
use crate::url::is_valid_pattern;
use crate::ConfigError;
use std::collections::HashSet;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;

    if config.sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[source]] must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for source in &config.sources {
        validate_source(source)?;
        if !seen.insert(source.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name '{}'",
                source.name
            )));
        }
    }

    Ok(())
}

/// Validates fetcher-wide settings
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("rate-window-seconds", config.rate_window_seconds),
        ("request-timeout-seconds", config.request_timeout_seconds),
        ("robots-timeout-seconds", config.robots_timeout_seconds),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    if let Some(path) = &config.failure_log_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "failure-log-path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates one source policy
fn validate_source(source: &SourcePolicy) -> Result<(), ConfigError> {
    if source.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "source name cannot be empty".to_string(),
        ));
    }

    if source.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "user-agent for source '{}' cannot be empty",
            source.name
        )));
    }

    if source.rate_limit_per_minute < 1 {
        return Err(ConfigError::Validation(format!(
            "rate-limit-per-minute for source '{}' must be >= 1, got {}",
            source.name, source.rate_limit_per_minute
        )));
    }

    validate_retry_policy(&source.name, &source.retry_policy)?;
    validate_terms_policy(&source.terms_policy)?;

    Ok(())
}

/// Validates a retry policy
fn validate_retry_policy(source: &str, retry: &RetryPolicy) -> Result<(), ConfigError> {
    if retry.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts for source '{}' must be >= 1, got {}",
            source, retry.max_attempts
        )));
    }

    for (name, value) in [
        ("base-backoff-seconds", retry.base_backoff_seconds),
        ("max-backoff-seconds", retry.max_backoff_seconds),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{} for source '{}' must be a non-negative number, got {}",
                name, source, value
            )));
        }
    }

    if retry.base_backoff_seconds > retry.max_backoff_seconds {
        return Err(ConfigError::Validation(format!(
            "base-backoff-seconds ({}) for source '{}' exceeds max-backoff-seconds ({})",
            retry.base_backoff_seconds, source, retry.max_backoff_seconds
        )));
    }

    Ok(())
}

/// Validates terms domain patterns
fn validate_terms_policy(terms: &TermsPolicy) -> Result<(), ConfigError> {
    for pattern in terms
        .prohibited_domains
        .iter()
        .chain(terms.allowed_domains.iter())
    {
        if !is_valid_pattern(pattern) {
            return Err(ConfigError::InvalidPattern(format!(
                "'{}' is not a valid domain pattern",
                pattern
            )));
        }
    }
    Ok(())
}
