//! Knowledge-graph proxy routes.
//!
//! Topic queries are relayed byte for byte, 402 included, so the browser's
//! payment client can see the requirements and the settlement receipt.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use dkgpedia_core::payment::{is_payment_header, PAYMENT_REQUEST_HEADERS};
use dkgpedia_core::DkgError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use super::{relay, relay_body};
use crate::error::{required, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /api/dkgpedia/search?keyword=&limit=`
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let keyword = required(params.keyword, "Keyword is required")?;
    let limit = params.limit.unwrap_or(state.config.search_limit);
    Ok(relay_body(state.dkg.search(&keyword, limit).await?))
}

/// `GET /api/dkgpedia/query/{topic_id}`
pub async fn query(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let forwarded: Vec<(String, String)> = PAYMENT_REQUEST_HEADERS
        .iter()
        .filter_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();

    let upstream = state.dkg.query_raw(&topic_id, &forwarded).await?;
    if upstream.status == 402 {
        info!(%topic_id, paid = !forwarded.is_empty(), "Topic query requires payment");
    }
    Ok(relay(upstream, is_payment_header))
}

/// Uniform publish result.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub ual: Option<String>,
    pub error: Option<String>,
}

impl PublishResponse {
    fn failed(status: StatusCode, message: impl Into<String>) -> Response {
        let body = Self {
            success: false,
            ual: None,
            error: Some(message.into()),
        };
        (status, Json(body)).into_response()
    }
}

/// `POST /api/dkgpedia/publish`
pub async fn publish(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return PublishResponse::failed(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let upstream = match state.dkg.publish(&body).await {
        Ok(upstream) => upstream,
        Err(DkgError::Timeout(_)) => {
            error!("Publish timed out");
            return PublishResponse::failed(StatusCode::GATEWAY_TIMEOUT, "Publish request timed out");
        }
        Err(e) => {
            error!(error = %e, "Publish failed");
            return PublishResponse::failed(StatusCode::BAD_GATEWAY, e.to_string());
        }
    };

    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let parsed = upstream.json().unwrap_or(Value::Null);

    if !upstream.is_success() {
        let message = string_field(&parsed, "error")
            .or_else(|| string_field(&parsed, "message"))
            .unwrap_or_else(|| upstream.text());
        warn!(status = upstream.status, %message, "Knowledge graph rejected publish");
        return PublishResponse::failed(status, message);
    }

    let ual = string_field(&parsed, "ual").or_else(|| parsed.get("data").and_then(|d| string_field(d, "ual")));
    let success = parsed.get("success").and_then(Value::as_bool).unwrap_or(true);
    info!(ual = ual.as_deref().unwrap_or("-"), success, "Asset published");

    let body = PublishResponse {
        success,
        ual,
        error: string_field(&parsed, "error"),
    };
    (status, Json(body)).into_response()
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}
