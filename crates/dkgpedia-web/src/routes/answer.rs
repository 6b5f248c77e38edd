//! Article correction route.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use dkgpedia_core::Contradiction;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub grokipedia_content: Option<String>,
    pub contradictions: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub success: bool,
    pub original_content: String,
    pub corrected_content: String,
    pub corrections_applied: usize,
}

/// `POST /api/answer`
pub async fn answer(
    State(state): State<AppState>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let Json(req) = payload?;

    let content = req
        .grokipedia_content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("grokipediaContent is required"))?;

    let Some(Value::Array(list)) = req.contradictions else {
        return Err(ApiError::bad_request("contradictions must be an array"));
    };

    // Entries past the cap are dropped unread.
    let contradictions = list
        .into_iter()
        .take(state.pipeline.max_contradictions())
        .enumerate()
        .map(|(i, entry)| {
            serde_json::from_value::<Contradiction>(entry).map_err(|e| {
                ApiError::bad_request("Invalid contradiction entry").with_details(format!("index {}: {}", i, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let report = state
        .pipeline
        .correct(state.corrector.as_ref(), &content, &contradictions)
        .await;
    info!(
        corrections = report.corrections_applied,
        calls = report.corrector_calls,
        "Answer generated"
    );

    Ok(Json(AnswerResponse {
        success: true,
        original_content: report.original_content,
        corrected_content: report.corrected_content,
        corrections_applied: report.corrections_applied,
    }))
}
