//! Error types for request construction and execution.
//!
//! # Design
//! Every failure reaches the caller as an `ApiError` value. Construction
//! failures (`UrlError`, `InvalidHeader`, `SerializationError`) surface
//! before any I/O and are never retried. A completed round trip with a
//! status other than 200 becomes `HttpError`, which still owns the full
//! `HttpResponse` so the body stays inspectable, together with the request
//! that produced it.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::TransportError;

/// Errors returned while building or executing a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint URL could not be parsed or extended with a query.
    #[error("invalid URL: {0}")]
    UrlError(String),

    /// A header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The round trip itself failed (connect, send, or body read).
    #[error(transparent)]
    TransportError(#[from] TransportError),

    /// No result arrived before the deadline.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The server answered with a status other than 200.
    #[error("{0}")]
    HttpError(Box<StatusError>),
}

impl ApiError {
    /// Whether a GET may be attempted again after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::TransportError(err) => err.is_retryable(),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }

    /// The response attached to an `HttpError`.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::HttpError(err) => Some(&err.response),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }
}

/// A non-200 response together with the request that produced it.
#[derive(Debug, Clone)]
pub struct StatusError {
    pub response: HttpResponse,
    pub request: HttpRequest,
    pub request_id: Uuid,
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP {} from {} {}: {}",
            self.response.status, self.request.method, self.request.url, self.response.body
        )
    }
}
