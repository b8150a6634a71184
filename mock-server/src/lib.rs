use std::time::Duration;

use axum::{
    extract::{Path, RawQuery},
    http::{HeaderMap, StatusCode},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw of a request, returned as JSON by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", get(echo_get).post(echo_post))
        .route("/status/{code}", any(status))
        .route("/slow/{ms}", get(slow))
        .route("/items", post(create_item))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo_get(RawQuery(query): RawQuery, headers: HeaderMap) -> Json<Echo> {
    Json(echo("GET", query, &headers, String::new()))
}

async fn echo_post(RawQuery(query): RawQuery, headers: HeaderMap, body: String) -> Json<Echo> {
    Json(echo("POST", query, &headers, body))
}

fn echo(method: &str, query: Option<String>, headers: &HeaderMap, body: String) -> Echo {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    // Only custom headers; client-added ones vary by HTTP library.
    let headers = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-"))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    Echo {
        method: method.to_string(),
        query,
        headers,
        content_type,
        body,
    }
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn slow(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "done"
}

#[derive(Debug, Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub count: u32,
}

/// Answers 200 rather than 201 so the strict client treats it as success.
async fn create_item(Json(input): Json<CreateItem>) -> Json<Item> {
    Json(Item {
        name: input.name,
        count: input.count,
    })
}
