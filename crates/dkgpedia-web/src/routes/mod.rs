//! Route handlers.

pub mod analyze;
pub mod answer;
pub mod dkgpedia;
pub mod lookup;

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use dkgpedia_upstream::UpstreamResponse;
use serde_json::{json, Value};

/// Liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Pass an upstream response through: status, content type, body, plus any
/// header `forward` accepts.
pub(crate) fn relay(upstream: UpstreamResponse, forward: impl Fn(&str) -> bool) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut headers = HeaderMap::new();

    let content_type = upstream
        .header(header::CONTENT_TYPE.as_str())
        .unwrap_or("application/json");
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }

    for (name, value) in &upstream.headers {
        if !forward(name) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.append(name, value);
        }
    }

    (status, headers, upstream.body).into_response()
}

/// Relay status and body only.
pub(crate) fn relay_body(upstream: UpstreamResponse) -> Response {
    relay(upstream, |_| false)
}
