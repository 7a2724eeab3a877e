//! HTTP capability used by the fetch pipeline
//!
//! The [`Fetcher`](crate::fetch::Fetcher) and the robots checker only need a
//! single operation: GET a URL with a user agent and a timeout, and get back a
//! status and body or a transport failure. [`HttpClient`] captures that
//! contract; [`ReqwestHttpClient`] is the production implementation.

use async_trait::async_trait;
use reqwest::{header::USER_AGENT, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A received HTTP response, whatever its status code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Failure to obtain a response at all
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Classifies a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Host-provided HTTP GET capability
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a GET for `url` with the given `User-Agent` and per-request timeout
    ///
    /// Any response that carries a status code is `Ok`, including 4xx and 5xx.
    async fn get(
        &self,
        url: &Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

/// Builds the shared reqwest client
///
/// Redirects are followed (up to 10 hops) and compressed bodies are decoded.
/// The user agent and timeout are set per request since they vary by source.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`HttpClient`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::from_client(build_http_client()?))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
