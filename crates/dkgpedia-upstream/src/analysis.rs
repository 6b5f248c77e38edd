//! Analysis engine client.
//!
//! The engine exposes `POST /analyze-lite` (form field `topic`),
//! `GET /progress?analysis_id=`, `GET /status/{id}` and `GET /results/{id}`.

use async_trait::async_trait;
use dkgpedia_core::progress::{classify, ProgressSource, ProgressState};
use dkgpedia_core::{Config, DkgResult};
use serde_json::Value;
use tracing::{debug, info};

use crate::http::{send_error, trim_base, UpstreamResponse};

const SERVICE: &str = "analysis engine";

/// Analysis engine HTTP client.
#[derive(Clone)]
pub struct AnalysisClient {
    base_url: String,
    client: reqwest::Client,
}

impl AnalysisClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: trim_base(base_url),
            client,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.analyze_api_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a lite analysis and return the raw engine response.
    pub async fn analyze_lite(&self, topic: &str) -> DkgResult<UpstreamResponse> {
        info!(topic, "Starting lite analysis");
        let response = self
            .client
            .post(format!("{}/analyze-lite", self.base_url))
            .form(&[("topic", topic)])
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        UpstreamResponse::read(SERVICE, response).await
    }

    /// Start a lite analysis. Failure envelopes are returned as payloads;
    /// other non-2xx responses are errors.
    pub async fn analyze(&self, topic: &str) -> DkgResult<Value> {
        engine_payload(self.analyze_lite(topic).await?)
    }

    /// Raw progress response for an analysis.
    pub async fn progress(&self, analysis_id: &str) -> DkgResult<UpstreamResponse> {
        debug!(analysis_id, "Fetching analysis progress");
        let response = self
            .client
            .get(format!("{}/progress", self.base_url))
            .query(&[("analysis_id", analysis_id)])
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        UpstreamResponse::read(SERVICE, response).await
    }

    /// Completion summary of a finished analysis.
    pub async fn status(&self, analysis_id: &str) -> DkgResult<Value> {
        self.get_by_id("status", analysis_id).await?.into_json(SERVICE)
    }

    /// Stored step results of a finished analysis.
    pub async fn results(&self, analysis_id: &str) -> DkgResult<Value> {
        self.get_by_id("results", analysis_id).await?.into_json(SERVICE)
    }

    async fn get_by_id(&self, resource: &str, analysis_id: &str) -> DkgResult<UpstreamResponse> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            resource,
            urlencoding::encode(analysis_id)
        );
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        UpstreamResponse::read(SERVICE, response).await
    }
}

#[async_trait]
impl ProgressSource for AnalysisClient {
    async fn fetch_progress(&self, analysis_id: &str) -> DkgResult<Value> {
        engine_payload(self.progress(analysis_id).await?)
    }
}

/// JSON body of an engine response.
///
/// The engine reports a failed run as `{"status":"error", "error"|"errors": ..}`
/// with an error status, either bare or under `detail`. That body is a result
/// to classify, not a transport failure. Any other non-2xx response stays an
/// upstream error.
fn engine_payload(response: UpstreamResponse) -> DkgResult<Value> {
    if !response.is_success() {
        if let Ok(mut body) = response.json() {
            // Error envelopes may arrive wrapped in `detail`.
            if body.get("detail").is_some_and(Value::is_object) {
                body = body["detail"].take();
            }
            if let ProgressState::Failed(message) = classify(&body) {
                debug!(status = response.status, %message, "Engine reported a failed run");
                return Ok(body);
            }
        }
    }
    response.into_json(SERVICE)
}
