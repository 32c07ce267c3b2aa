//! HTTP transport used by the retrying fetcher
//!
//! The fetcher only needs "GET this URL, give me a status and a body". That
//! capability is the `Transport` trait; `ReqwestTransport` is the production
//! implementation and tests plug in scripted stubs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// Errors raised when the request itself could not be completed
#[derive(Debug, Error)]
pub enum TransportError {
    /// reqwest failed to send the request or read the body
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Any other transport-level failure (used by alternative transports)
    #[error("{0}")]
    Other(String),
}

/// A completed HTTP exchange, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Numeric status code
    pub status: u16,
    /// Canonical reason phrase, if the status has one
    pub reason: Option<String>,
    /// Raw response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with the given status and body
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string);
        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Something that can perform a GET request against a fully formed URL
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues one GET request. Non-2xx statuses are returned as `Ok`.
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    /// Create a new transport with default client settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a new transport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Create a transport whose requests give up after `timeout`
    ///
    /// A timed-out request surfaces as a `TransportError`, so the fetcher
    /// counts it as a failed attempt.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body: body.to_vec(),
        })
    }
}
