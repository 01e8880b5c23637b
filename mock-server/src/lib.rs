use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// What the server saw of a request sent to `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Echo {
    /// Value of the first header called `name` (lowercase).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Requests served per status code by `/status/{code}`.
pub type Hits = Arc<RwLock<HashMap<u16, u64>>>;

pub fn app() -> Router {
    let hits: Hits = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/ok", get(ok))
        .route("/status/{code}", any(status))
        .route("/hits/{code}", get(hit_count))
        .route("/echo", any(echo))
        .with_state(hits)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

async fn ok() -> &'static str {
    "ok"
}

async fn status(State(hits): State<Hits>, Path(code): Path<u16>) -> Result<Response, StatusCode> {
    if code < 200 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    *hits.write().await.entry(code).or_insert(0) += 1;
    tracing::debug!(code, "serving canned status");

    let mut response = (status, format!("status {code}")).into_response();
    if status.is_redirection() {
        response
            .headers_mut()
            .insert(header::LOCATION, HeaderValue::from_static("/ok"));
    }
    Ok(response)
}

async fn hit_count(State(hits): State<Hits>, Path(code): Path<u16>) -> Json<u64> {
    Json(hits.read().await.get(&code).copied().unwrap_or(0))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers,
        body,
    })
}
