//! Request building and execution for a single remote HTTP API.
//!
//! # Overview
//! Callers resolve an `Endpoint`, configure a `DraftRequest` through its
//! fluent methods, and execute it. Execution materializes the draft into a
//! plain-data `HttpRequest`, runs it through a `Transport` with an optional
//! deadline and GET retries, and classifies the result.
//!
//! # Design
//! - Parameters are `TypedValue`s kept in ordered lists; encoding happens
//!   only at materialization.
//! - Materialization is pure. The `Transport` trait is the only I/O seam,
//!   and it receives a cancellation token so timed-out attempts stop.
//! - Options are copied by value into every endpoint and draft.
//! - Only status 200 is success. Other statuses become `ApiError::HttpError`
//!   carrying the response and the originating request.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use apicall_core::{ApiClient, Options, ReqwestTransport};
//!
//! let client = ApiClient::parse("https://api.example.com/v1/", Arc::new(ReqwestTransport::new()))?
//!     .with_options(Options::new().with_timeout(Duration::from_secs(5)).with_retries(2));
//! let response = client
//!     .endpoint("items")?
//!     .new_request()
//!     .add_query_int("limit", 10)
//!     .get()
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod executor;
pub mod http;
pub mod materialize;
pub mod options;
pub mod request;
pub mod response;
pub mod transport;
pub mod value;

pub use client::{ApiClient, Endpoint};
pub use error::{ApiError, StatusError};
pub use executor::{ExecutionOutcome, Executor};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use materialize::materialize;
pub use options::{Options, RETRY_DELAY};
pub use request::DraftRequest;
pub use response::classify;
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use value::{KeyValuePair, ParameterSet, TypedValue};
