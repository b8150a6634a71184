//! Turns a `DraftRequest` into a wire-ready `HttpRequest`.
//!
//! # Design
//! Materialization is pure: no I/O, same output for the same input.
//!
//! - Queries are appended to whatever query the base URL already carries,
//!   in insertion order, with `application/x-www-form-urlencoded` escaping.
//!   Duplicate keys each produce their own `key=value` entry.
//! - Headers are assigned: setting a name again (case-insensitively)
//!   replaces the earlier value in place. Names and values must be valid
//!   HTTP header tokens.
//! - Only `http` and `https` URLs are accepted.
//! - A non-empty raw body wins over form fields. Without any body-mutating
//!   call no body is attached.

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::request::DraftRequest;
use crate::value::ParameterSet;

/// Build the request `method` would send to `base_url` for `draft`.
pub fn materialize(
    method: HttpMethod,
    base_url: &str,
    draft: &DraftRequest,
) -> Result<HttpRequest, ApiError> {
    let url = query_url(base_url, draft.queries())?;

    Ok(HttpRequest {
        method,
        url: url.into(),
        headers: assign_headers(draft.headers())?,
        body: render_body(draft),
    })
}

/// Parse `base_url` and append `queries` in insertion order.
pub(crate) fn query_url(base_url: &str, queries: &ParameterSet) -> Result<Url, ApiError> {
    let mut url =
        Url::parse(base_url).map_err(|e| ApiError::UrlError(format!("{base_url}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::UrlError(format!(
            "{base_url}: unsupported scheme `{}`",
            url.scheme()
        )));
    }

    if !queries.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in queries.serialized() {
            pairs.append_pair(key, &value);
        }
    }
    Ok(url)
}

fn assign_headers(headers: &ParameterSet) -> Result<Vec<(String, String)>, ApiError> {
    let mut assigned: Vec<(String, String)> = Vec::with_capacity(headers.len());
    for (key, value) in headers.serialized() {
        HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| ApiError::InvalidHeader(format!("name `{key}`")))?;
        HeaderValue::from_str(&value)
            .map_err(|_| ApiError::InvalidHeader(format!("value of `{key}`")))?;
        match assigned
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
        {
            Some(slot) => *slot = (key.to_string(), value),
            None => assigned.push((key.to_string(), value)),
        }
    }
    Ok(assigned)
}

fn render_body(draft: &DraftRequest) -> Option<String> {
    if !draft.has_body() {
        return None;
    }
    if let Some(raw) = draft.raw_body().filter(|raw| !raw.is_empty()) {
        return Some(raw.to_string());
    }
    if draft.body_fields().is_empty() {
        return None;
    }

    let mut form = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in draft.body_fields().serialized() {
        form.append_pair(key, &value);
    }
    Some(form.finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::Endpoint;
    use crate::transport::ReqwestTransport;

    const BASE_URL: &str = "https://api.example.com/v1/items";

    fn draft() -> DraftRequest {
        Endpoint::new(BASE_URL, Arc::new(ReqwestTransport::new())).new_request()
    }

    #[test]
    fn duplicate_query_keys_repeat_in_order() {
        let draft = draft()
            .add_query("a", "1")
            .add_query("a", "2")
            .add_query("b", "x");
        let req = materialize(HttpMethod::Get, BASE_URL, &draft).unwrap();
        assert_eq!(req.url, "https://api.example.com/v1/items?a=1&a=2&b=x");
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let draft = draft().add_query("q", "a b&c=d").add_query("ü", "é");
        let req = materialize(HttpMethod::Get, BASE_URL, &draft).unwrap();
        assert_eq!(
            req.url,
            "https://api.example.com/v1/items?q=a+b%26c%3Dd&%C3%BC=%C3%A9"
        );
    }

    #[test]
    fn existing_query_is_kept() {
        let base = "https://api.example.com/v1/items?page=2";
        let draft = draft().add_query_int("limit", 10);
        let req = materialize(HttpMethod::Get, base, &draft).unwrap();
        assert_eq!(req.url, "https://api.example.com/v1/items?page=2&limit=10");
    }

    #[test]
    fn no_queries_leaves_url_untouched() {
        let req = materialize(HttpMethod::Get, BASE_URL, &draft()).unwrap();
        assert_eq!(req.url, BASE_URL);
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn repeated_header_keeps_last_value() {
        let draft = draft()
            .add_header("X-Api-Version", "1")
            .add_header("Accept", "application/json")
            .add_header("x-api-version", "2");
        let req = materialize(HttpMethod::Get, BASE_URL, &draft).unwrap();
        assert_eq!(
            req.headers,
            vec![
                ("x-api-version".to_string(), "2".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ]
        );
        assert_eq!(req.header("X-API-VERSION"), Some("2"));
    }

    #[test]
    fn form_fields_become_urlencoded_body() {
        let draft = draft()
            .form_encoded()
            .add_body_field("name", "blue widget")
            .add_body_field("tag", "a")
            .add_body_field("tag", "b");
        let req = materialize(HttpMethod::Post, BASE_URL, &draft).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body.as_deref(), Some("name=blue+widget&tag=a&tag=b"));
        assert_eq!(
            req.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn raw_body_wins_over_form_fields() {
        let draft = draft()
            .add_body_field("ignored", "1")
            .set_json_body(&serde_json::json!({"id": 1}))
            .unwrap();
        let req = materialize(HttpMethod::Post, BASE_URL, &draft).unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"id":1}"#));
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let err = materialize(HttpMethod::Get, "::not a url::", &draft()).unwrap_err();
        assert!(matches!(err, ApiError::UrlError(_)));

        let err =
            materialize(HttpMethod::Get, "mailto:someone@example.com", &draft()).unwrap_err();
        assert!(matches!(err, ApiError::UrlError(_)));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err =
            materialize(HttpMethod::Get, "ftp://files.example.com/pub", &draft()).unwrap_err();
        assert!(matches!(err, ApiError::UrlError(_)));
        assert!(err.to_string().contains("ftp"), "{err}");
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let draft = draft().add_header("bad header", "v");
        let err = materialize(HttpMethod::Get, BASE_URL, &draft).unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn invalid_header_value_is_rejected() {
        let draft = draft().add_header("X-Note", "line one\nline two");
        let err = materialize(HttpMethod::Get, BASE_URL, &draft).unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader(_)));
    }

    #[test]
    fn materialize_is_deterministic() {
        let draft = draft().add_query("a", "1").add_header("H", "v");
        let first = materialize(HttpMethod::Get, BASE_URL, &draft).unwrap();
        let second = materialize(HttpMethod::Get, BASE_URL, &draft).unwrap();
        assert_eq!(first, second);
    }
}
