//! Fetch orchestration
//!
//! This module contains the core fetch pipeline, including:
//! - The [`HttpClient`] capability and its reqwest implementation
//! - Typed outcomes: [`FetchResult`], [`FetchOutcome`] and [`Rejection`]
//! - The [`Fetcher`], which runs the terms, robots and rate gates and then the
//!   bounded retry loop with exponential backoff

mod client;
mod fetcher;
mod outcome;

pub use client::{build_http_client, HttpClient, HttpResponse, ReqwestHttpClient, TransportError};
pub use fetcher::{Fetcher, DEFAULT_REQUEST_TIMEOUT};
pub use outcome::{FetchOutcome, FetchResult, Rejection};
