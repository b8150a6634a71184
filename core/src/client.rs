//! API clients and the endpoints they resolve.
//!
//! # Design
//! `ApiClient` holds a base URL, the default `Options` and the shared
//! `Transport`. `ApiClient::endpoint` resolves a path against the base URL
//! and hands the endpoint a copy of the client's options; each
//! `Endpoint::new_request` copies the endpoint's options again. Options are
//! plain values at every level, so changing a default never reaches objects
//! created earlier.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::error::ApiError;
use crate::options::Options;
use crate::request::DraftRequest;
use crate::transport::Transport;

/// Entry point for one remote API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    options: Options,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            options: Options::default(),
            transport,
        }
    }

    /// Parse `base_url` and build a client around it.
    pub fn parse(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self, ApiError> {
        let url = Url::parse(base_url).map_err(|e| ApiError::UrlError(format!("{base_url}: {e}")))?;
        Ok(Self::new(url, transport))
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Resolve `path` against the base URL.
    ///
    /// Follows URL reference rules: a base without a trailing slash has its
    /// last segment replaced, and a leading `/` replaces the whole path.
    pub fn endpoint(&self, path: &str) -> Result<Endpoint, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::UrlError(format!("{path}: {e}")))?;
        Ok(Endpoint {
            url: url.into(),
            options: self.options,
            transport: Arc::clone(&self.transport),
        })
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A named remote resource: a URL plus default execution options.
#[derive(Clone)]
pub struct Endpoint {
    url: String,
    options: Options,
    transport: Arc<dyn Transport>,
}

impl Endpoint {
    /// An endpoint with default options. The URL is validated when a
    /// request is materialized.
    pub fn new(url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            url: url.into(),
            options: Options::default(),
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Start a draft carrying a copy of the current options.
    pub fn new_request(&self) -> DraftRequest {
        DraftRequest::new(self.url.clone(), Arc::clone(&self.transport), self.options)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
