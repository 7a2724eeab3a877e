//! Fetch results and typed rejection reasons

use crate::metrics::FailureKind;
use std::time::Duration;
use thiserror::Error;

/// A fetched resource, handed to the caller by value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// The URL that was requested
    pub url: String,
    /// HTTP status code of the final response
    pub status_code: u16,
    /// Raw response body
    pub content: Vec<u8>,
}

/// Why a fetch produced no result
///
/// The display string is the reason recorded in the metrics and failure log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("Domain {domain} is prohibited by terms policy")]
    PolicyViolation { domain: String },

    #[error("Robots.txt disallows fetching {url}")]
    RobotsDisallowed { url: String },

    #[error(
        "Rate limit exceeded for {source_name}, retry after {:.2}s",
        .retry_after.as_secs_f64()
    )]
    RateLimited {
        source_name: String,
        retry_after: Duration,
    },

    #[error("HTTP {status} for {url}")]
    ServerError { status: u16, url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Request failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Fetch cancelled for {url}")]
    Cancelled { url: String },
}

impl Rejection {
    pub fn kind(&self) -> FailureKind {
        match self {
            Rejection::PolicyViolation { .. } => FailureKind::PolicyViolation,
            Rejection::RobotsDisallowed { .. } => FailureKind::RobotsDisallowed,
            Rejection::RateLimited { .. } => FailureKind::RateLimited,
            Rejection::ServerError { .. } => FailureKind::ServerError,
            Rejection::HttpStatus { .. } => FailureKind::HttpStatus,
            Rejection::Transport { .. } => FailureKind::Transport,
            Rejection::Cancelled { .. } => FailureKind::Cancelled,
        }
    }

    /// Whether the attempt loop may try again after this outcome
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Rejection::ServerError { .. } | Rejection::Transport { .. }
        )
    }
}

/// Terminal outcome of a fetch: a result or a rejection, never both
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(FetchResult),
    Rejected(Rejection),
}

impl FetchOutcome {
    /// Collapses the outcome to "result or absence"
    pub fn into_result(self) -> Option<FetchResult> {
        match self {
            FetchOutcome::Fetched(result) => Some(result),
            FetchOutcome::Rejected(_) => None,
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }

    pub fn fetched(&self) -> Option<&FetchResult> {
        match self {
            FetchOutcome::Fetched(result) => Some(result),
            FetchOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            FetchOutcome::Fetched(_) => None,
            FetchOutcome::Rejected(rejection) => Some(rejection),
        }
    }
}
