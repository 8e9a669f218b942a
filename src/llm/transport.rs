//! HTTP transport for completion requests.
//!
//! [`Transport`] performs a single round trip. [`RetryingTransport`] wraps any
//! transport and re-sends on transient failures with exponential backoff.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{ChatRequest, HttpReply};
use crate::config::Config;
use crate::error::QaError;

/// HTTP statuses worth retrying.
pub const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Failure below the HTTP status level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("failed to read response: {0}")]
    Read(String),
    /// The request could not be built or sent at all (bad URL etc).
    #[error("invalid request: {0}")]
    Invalid(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_redirect() {
            Self::Invalid(e.to_string())
        } else {
            Self::Read(e.to_string())
        }
    }
}

/// Sends one completion request and returns the raw HTTP outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<HttpReply, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &ChatRequest) -> Result<HttpReply, TransportError> {
        (**self).send(request).await
    }
}

/// reqwest-backed transport with a per-request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, QaError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QaError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(&request.endpoint)
            .bearer_auth(&request.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Read(e.to_string()))?;

        Ok(HttpReply { status, body })
    }
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each later one
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: config.backoff_base(),
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_millis(300),
        }
    }
}

/// Decorator that retries transient failures of the inner transport.
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

fn is_retryable(outcome: &Result<HttpReply, TransportError>) -> bool {
    match outcome {
        Ok(reply) => RETRYABLE_STATUSES.contains(&reply.status),
        Err(e) => e.is_transient(),
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryingTransport<T> {
    async fn send(&self, request: &ChatRequest) -> Result<HttpReply, TransportError> {
        let mut retries = 0u32;
        loop {
            let outcome = self.inner.send(request).await;
            if !is_retryable(&outcome) {
                return outcome;
            }
            if retries >= self.policy.max_retries {
                debug!(retries, "retry budget exhausted");
                return outcome;
            }

            retries += 1;
            let delay = self.policy.delay_for(retries);
            match &outcome {
                Ok(reply) => warn!(status = reply.status, retry = retries, ?delay, "transient HTTP status, retrying"),
                Err(e) => warn!(error = %e, retry = retries, ?delay, "transport failure, retrying"),
            }
            tokio::time::sleep(delay).await;
        }
    }
}
