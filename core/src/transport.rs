//! The network round trip.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. It receives a materialized
//! `HttpRequest` plus a `CancellationToken`; when the executor's deadline
//! fires it cancels the token, and implementations must stop the attempt and
//! release the connection instead of running on in the background.
//!
//! Non-200 statuses are not transport errors. A transport returns every
//! completed response as data and leaves status interpretation to the
//! classifier.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::http::{HttpRequest, HttpResponse};

/// Failures of the round trip itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client reported a network or protocol failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The connection could not be established or was lost.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The attempt observed its cancellation token and stopped.
    #[error("request cancelled")]
    Cancelled,

    /// The task running the attempt ended without producing a result.
    #[error("request task aborted: {0}")]
    Aborted(String),
}

impl TransportError {
    /// Network failures may succeed on a later attempt. A request the HTTP
    /// client refused to build, or one that was cancelled, will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(err) => !err.is_builder(),
            Self::Connection(_) => true,
            Self::Cancelled | Self::Aborted(_) => false,
        }
    }
}

/// Performs one HTTP round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: HttpRequest,
        cancel: CancellationToken,
    ) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: HttpRequest,
        cancel: CancellationToken,
    ) -> Result<HttpResponse, TransportError> {
        // Dropping the in-flight future closes the connection.
        tokio::select! {
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.round_trip(request) => result,
        }
    }
}
