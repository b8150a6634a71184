//! Draft requests: the fluent surface callers configure before execution.
//!
//! # Design
//! A `DraftRequest` is created by `Endpoint::new_request`, which copies the
//! endpoint's `Options` by value. The builder methods take and return `self`
//! so configuration chains; `set_json_body` is the only fallible step and
//! returns `Result<Self, ApiError>` so a serialization failure can never
//! yield a half-built draft.
//!
//! Execution (`get`, `post`, `execute`) consumes the draft. Nothing is
//! validated or encoded here; keys and values pass through verbatim and the
//! materializer does all encoding.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::executor::{ExecutionOutcome, Executor};
use crate::http::HttpMethod;
use crate::materialize::query_url;
use crate::options::Options;
use crate::transport::Transport;
use crate::value::ParameterSet;

/// Content type set by `form_encoded`.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An in-progress request against one endpoint URL.
pub struct DraftRequest {
    id: Uuid,
    url: String,
    transport: Arc<dyn Transport>,
    options: Options,
    queries: ParameterSet,
    headers: ParameterSet,
    body_fields: ParameterSet,
    raw_body: Option<String>,
    has_body: bool,
}

impl DraftRequest {
    pub(crate) fn new(url: String, transport: Arc<dyn Transport>, options: Options) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            transport,
            options,
            queries: ParameterSet::new(),
            headers: ParameterSet::new(),
            body_fields: ParameterSet::new(),
            raw_body: None,
            has_body: false,
        }
    }

    pub fn add_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.queries.push(key, value.into());
        self
    }

    pub fn add_query_int(mut self, key: impl Into<String>, value: i64) -> Self {
        self.queries.push(key, value);
        self
    }

    pub fn add_query_bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.queries.push(key, value);
        self
    }

    /// Headers with the same name overwrite each other at materialization.
    pub fn add_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(key, value.into());
        self
    }

    /// Adds `Content-Type: application/x-www-form-urlencoded`.
    pub fn form_encoded(self) -> Self {
        self.add_header("Content-Type", FORM_CONTENT_TYPE)
    }

    /// Appends a form field to the body.
    pub fn add_body_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body_fields.push(key, value.into());
        self.has_body = true;
        self
    }

    /// Replaces the body with the JSON encoding of `value`.
    ///
    /// A raw body takes precedence over any form fields.
    pub fn set_json_body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ApiError> {
        let text = serde_json::to_string(value)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        self.raw_body = Some(text);
        self.has_body = true;
        Ok(self)
    }

    /// The GET URL this draft would call, without performing the call.
    /// Useful for callback and redirect URLs.
    pub fn build_query_url(&self) -> Result<String, ApiError> {
        query_url(&self.url, &self.queries).map(String::from)
    }

    pub async fn get(self) -> ExecutionOutcome {
        self.execute(HttpMethod::Get).await
    }

    pub async fn post(self) -> ExecutionOutcome {
        self.execute(HttpMethod::Post).await
    }

    pub async fn execute(self, method: HttpMethod) -> ExecutionOutcome {
        Executor::new(Arc::clone(&self.transport))
            .execute(method, &self)
            .await
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Per-draft override; the endpoint's defaults are untouched.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn queries(&self) -> &ParameterSet {
        &self.queries
    }

    pub fn headers(&self) -> &ParameterSet {
        &self.headers
    }

    pub fn body_fields(&self) -> &ParameterSet {
        &self.body_fields
    }

    pub fn raw_body(&self) -> Option<&str> {
        self.raw_body.as_deref()
    }

    pub fn has_body(&self) -> bool {
        self.has_body
    }
}

impl fmt::Debug for DraftRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftRequest")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("options", &self.options)
            .field("queries", &self.queries)
            .field("headers", &self.headers)
            .field("body_fields", &self.body_fields)
            .field("raw_body", &self.raw_body)
            .field("has_body", &self.has_body)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::value::TypedValue;
    use crate::ReqwestTransport;

    const BASE_URL: &str = "https://api.example.com/v1/items";

    fn draft() -> DraftRequest {
        DraftRequest::new(
            BASE_URL.to_string(),
            Arc::new(ReqwestTransport::new()),
            Options::default(),
        )
    }

    /// Serializing this map fails because JSON object keys must be strings.
    fn unserializable() -> BTreeMap<Vec<u8>, u8> {
        let mut map = BTreeMap::new();
        map.insert(vec![1, 2], 3);
        map
    }

    #[test]
    fn fluent_calls_append_in_order() {
        let draft = draft()
            .add_query("q", "rust")
            .add_query_int("limit", 10)
            .add_query_bool("active", true)
            .add_header("X-Trace", "abc");

        let queries: Vec<_> = draft.queries().iter().map(|p| p.value.clone()).collect();
        assert_eq!(
            queries,
            vec![
                TypedValue::String("rust".to_string()),
                TypedValue::Int(10),
                TypedValue::Bool(true),
            ]
        );
        assert_eq!(draft.headers().len(), 1);
        assert!(!draft.has_body());
    }

    #[test]
    fn keys_pass_through_verbatim() {
        let draft = draft().add_query("a b", "c&d");
        let pair = draft.queries().iter().next().unwrap();
        assert_eq!(pair.key, "a b");
        assert_eq!(pair.value.serialize(), "c&d");
    }

    #[test]
    fn form_encoded_adds_content_type() {
        let draft = draft().form_encoded();
        let pair = draft.headers().iter().next().unwrap();
        assert_eq!(pair.key, "Content-Type");
        assert_eq!(pair.value.serialize(), FORM_CONTENT_TYPE);
    }

    #[test]
    fn body_field_marks_body() {
        let draft = draft().add_body_field("name", "widget");
        assert!(draft.has_body());
        assert_eq!(draft.body_fields().len(), 1);
        assert_eq!(draft.raw_body(), None);
    }

    #[test]
    fn json_body_is_canonical_text() {
        let draft = draft()
            .set_json_body(&serde_json::json!({"name": "widget", "count": 2}))
            .unwrap();
        assert!(draft.has_body());
        assert_eq!(draft.raw_body(), Some(r#"{"count":2,"name":"widget"}"#));
    }

    #[test]
    fn json_body_failure_is_explicit() {
        let err = draft().set_json_body(&unserializable()).unwrap_err();
        assert!(matches!(err, ApiError::SerializationError(_)));
    }

    #[test]
    fn build_query_url_keeps_insertion_order() {
        let url = draft()
            .add_query_int("limit", 10)
            .add_query_bool("active", true)
            .build_query_url()
            .unwrap();
        assert_eq!(url, "https://api.example.com/v1/items?limit=10&active=true");
    }

    #[test]
    fn build_query_url_without_queries() {
        assert_eq!(draft().build_query_url().unwrap(), BASE_URL);
    }

    #[test]
    fn build_query_url_rejects_malformed_base() {
        let draft = DraftRequest::new(
            "not a url".to_string(),
            Arc::new(ReqwestTransport::new()),
            Options::default(),
        );
        let err = draft.build_query_url().unwrap_err();
        assert!(matches!(err, ApiError::UrlError(_)));
    }

    #[test]
    fn options_override_is_local() {
        let mut draft = draft();
        draft.options_mut().retries = 4;
        assert_eq!(draft.options().retries, 4);
        let other = self::draft();
        assert_eq!(other.options().retries, 0);
    }

    #[test]
    fn each_draft_gets_its_own_id() {
        assert_ne!(draft().id(), draft().id());
    }
}
