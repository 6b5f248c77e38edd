//! Analysis engine proxy routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::Response,
    Json,
};
use serde::Deserialize;

use super::relay_body;
use crate::error::{required, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub topic: Option<String>,
}

#[derive(Deserialize)]
pub struct ProgressParams {
    pub analysis_id: Option<String>,
}

/// `POST /api/analyze-lite`
pub async fn analyze_lite(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let topic = required(req.topic, "Topic is required")?;

    let upstream = state.analysis.analyze_lite(&topic).await?;
    tracing::debug!(%topic, status = upstream.status, "analyze-lite relayed");
    Ok(relay_body(upstream))
}

/// `GET /api/progress?analysis_id=`
pub async fn progress(
    State(state): State<AppState>,
    params: Result<Query<ProgressParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let analysis_id = required(params.analysis_id, "analysis_id is required")?;
    let upstream = state.analysis.progress(&analysis_id).await?;
    Ok(relay_body(upstream))
}
