//! End-to-end answer flow for a topic.
//!
//! cache → knowledge graph → analysis (+ progress polling) → article → correction → cache.

use dkgpedia_core::payment::PaymentSigner;
use dkgpedia_core::progress::{classify, ProgressState};
use dkgpedia_core::{
    AnalysisResult, AnswerCache, AnswerData, Config, CorrectionPipeline, Corrector, DkgError,
    DkgResult, PaymentInfo, ProgressOutcome, ProgressSnapshot, ProgressTracker,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::AnalysisClient;
use crate::dkg::{DkgClient, QueryOutcome};
use crate::openai::OpenAiCorrector;
use crate::scraper::ScraperClient;

/// How a topic request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// Answer already held for this topic.
    Cached(AnswerData),
    /// The knowledge graph already holds a published asset.
    Published(Value),
    /// The asset is priced and no wallet is connected.
    Paywall(PaymentInfo),
    /// Fresh analysis and correction.
    Answered(AnswerData),
    /// The analysis engine reported an error.
    Failed(String),
    /// The analysis never reached a terminal state.
    Stalled { attempts: u32 },
}

/// Orchestrates the services behind a topic page.
pub struct AnswerFlow {
    analysis: AnalysisClient,
    dkg: DkgClient,
    scraper: ScraperClient,
    corrector: Arc<dyn Corrector>,
    signer: Option<Arc<dyn PaymentSigner>>,
    tracker: ProgressTracker,
    pipeline: CorrectionPipeline,
    cache: Arc<AnswerCache>,
}

impl AnswerFlow {
    pub fn new(
        analysis: AnalysisClient,
        dkg: DkgClient,
        scraper: ScraperClient,
        corrector: Arc<dyn Corrector>,
    ) -> Self {
        Self {
            analysis,
            dkg,
            scraper,
            corrector,
            signer: None,
            tracker: ProgressTracker::default(),
            pipeline: CorrectionPipeline::default(),
            cache: Arc::new(AnswerCache::default()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AnalysisClient::from_config(config),
            DkgClient::from_config(config),
            ScraperClient::from_config(config),
            Arc::new(OpenAiCorrector::from_config(config)),
        )
        .with_tracker(ProgressTracker::from_config(config))
        .with_cache(Arc::new(AnswerCache::from_config(config)))
    }

    /// Connect a wallet.
    pub fn with_signer(mut self, signer: Arc<dyn PaymentSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_tracker(mut self, tracker: ProgressTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_cache(mut self, cache: Arc<AnswerCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn wallet_connected(&self) -> bool {
        self.signer.is_some()
    }

    pub fn cache(&self) -> &AnswerCache {
        &self.cache
    }

    /// Resolve `topic`, reporting analysis progress to `observer`.
    pub async fn run<F>(&self, topic: &str, observer: F) -> DkgResult<FlowOutcome>
    where
        F: FnMut(&ProgressSnapshot),
    {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DkgError::validation("Topic is required"));
        }

        if let Some(answer) = self.cache.get(topic) {
            info!(topic, "Answer served from cache");
            return Ok(FlowOutcome::Cached(answer));
        }

        match self.dkg.query(topic, self.signer.as_deref()).await {
            Ok(QueryOutcome::Found { asset, .. }) => return Ok(FlowOutcome::Published(asset)),
            Ok(QueryOutcome::Paywall(info)) => return Ok(FlowOutcome::Paywall(info)),
            Ok(QueryOutcome::NotFound) => {}
            Err(DkgError::PaymentRejected) => return Err(DkgError::PaymentRejected),
            Err(e) => warn!(topic, error = %e, "Knowledge graph check failed, running fresh analysis"),
        }

        let payload = match self.analyze(topic, observer).await? {
            Ok(payload) => payload,
            Err(outcome) => return Ok(outcome),
        };
        let analysis = AnalysisResult::from_value(payload)?;

        let article = self.scraper.fetch_article_text(topic).await?;
        let report = self
            .pipeline
            .correct(self.corrector.as_ref(), &article, &analysis.contradictions())
            .await;

        let answer = AnswerData {
            original_content: report.original_content,
            corrected_content: report.corrected_content,
            analysis_result: analysis,
            topic: topic.to_string(),
        };
        self.cache.put(answer.clone());
        info!(
            topic,
            corrections = report.corrections_applied,
            changed = answer.has_corrections(),
            "Answer ready"
        );
        Ok(FlowOutcome::Answered(answer))
    }

    /// Start analysis and wait for its result payload, or a terminal non-success outcome.
    async fn analyze<F>(&self, topic: &str, observer: F) -> DkgResult<Result<Value, FlowOutcome>>
    where
        F: FnMut(&ProgressSnapshot),
    {
        let started = self.analysis.analyze(topic).await?;

        match classify(&started) {
            ProgressState::Success => Ok(Ok(started)),
            ProgressState::Failed(message) => Ok(Err(FlowOutcome::Failed(message))),
            ProgressState::InProgress(_) | ProgressState::Unknown => {
                let Some(analysis_id) = started.get("analysis_id").and_then(Value::as_str) else {
                    return Ok(Err(FlowOutcome::Failed(
                        "Analysis engine returned no analysis id".to_string(),
                    )));
                };

                Ok(match self.tracker.track(&self.analysis, analysis_id, observer).await {
                    ProgressOutcome::Completed(payload) => Ok(payload),
                    ProgressOutcome::Failed(message) => Err(FlowOutcome::Failed(message)),
                    ProgressOutcome::Stalled { attempts } => Err(FlowOutcome::Stalled { attempts }),
                })
            }
        }
    }

    /// Forget the answer for `topic` once its view is closed.
    pub fn close(&self, topic: &str) -> bool {
        self.cache.remove(topic.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockito::{Matcher, ServerGuard};
    use serde_json::json;
    use std::time::Duration;

    struct LiteralCorrector;

    #[async_trait]
    impl Corrector for LiteralCorrector {
        async fn replace_term(&self, paragraph: &str, old: &str, new: &str) -> DkgResult<String> {
            Ok(paragraph.replace(old, new))
        }
    }

    fn flow(server: &ServerGuard) -> AnswerFlow {
        AnswerFlow::new(
            AnalysisClient::new(&server.url()),
            DkgClient::new(&server.url()),
            ScraperClient::new(&server.url()),
            Arc::new(LiteralCorrector),
        )
        .with_tracker(ProgressTracker::new(Duration::from_millis(10), 5))
    }

    fn results() -> Value {
        json!({
            "fetch": { "status": "success" },
            "triple": {
                "status": "success",
                "contradictions": {
                    "contradiction_count": 1,
                    "contradictions": [{
                        "subject": "cattle",
                        "predicate": "are",
                        "source_a_object": "large quadrupedal ungulates",
                        "source_b_object": "large artiodactyls"
                    }]
                }
            }
        })
    }

    async fn mock_not_published(server: &mut ServerGuard) {
        server
            .mock("GET", "/api/dkgpedia/query/Cattle")
            .with_status(404)
            .create_async()
            .await;
    }

    async fn mock_article(server: &mut ServerGuard) {
        server
            .mock("POST", "/scrape")
            .with_status(200)
            .with_body(
                json!({ "content_text": "Cattle are large quadrupedal ungulates.\n\nThey live in herds." })
                    .to_string(),
            )
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn test_synchronous_analysis_is_corrected_and_cached() {
        let mut server = mockito::Server::new_async().await;
        mock_not_published(&mut server).await;
        mock_article(&mut server).await;
        server
            .mock("POST", "/analyze-lite")
            .with_status(200)
            .with_body(json!({ "status": "success", "analysis_id": "lite_1", "results": results() }).to_string())
            .create_async()
            .await;
        let progress = server
            .mock("GET", "/progress")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let flow = flow(&server);
        let outcome = flow.run("Cattle", |_| {}).await.unwrap();
        let answer = match outcome {
            FlowOutcome::Answered(answer) => answer,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(
            answer.corrected_content,
            "Cattle are large artiodactyls.\n\nThey live in herds."
        );
        progress.assert_async().await;

        assert!(matches!(flow.run("Cattle", |_| {}).await.unwrap(), FlowOutcome::Cached(_)));
        assert!(flow.close("Cattle"));
        assert!(flow.cache().get("Cattle").is_none());
    }

    #[tokio::test]
    async fn test_asynchronous_analysis_polls_until_done() {
        let mut server = mockito::Server::new_async().await;
        mock_not_published(&mut server).await;
        mock_article(&mut server).await;
        server
            .mock("POST", "/analyze-lite")
            .with_status(200)
            .with_body(r#"{"status":"in_progress","analysis_id":"lite_1"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/progress")
            .match_query(Matcher::UrlEncoded("analysis_id".into(), "lite_1".into()))
            .with_status(200)
            .with_body(json!({ "status": "success", "results": results() }).to_string())
            .expect(1)
            .create_async()
            .await;

        let outcome = flow(&server).run("Cattle", |_| {}).await.unwrap();
        assert!(matches!(outcome, FlowOutcome::Answered(ref a) if a.has_corrections()));
    }

    #[tokio::test]
    async fn test_published_asset_short_circuits() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/dkgpedia/query/Cattle")
            .with_status(200)
            .with_body(r#"{"topicId":"Cattle","ual":"did:dkg:1"}"#)
            .create_async()
            .await;
        let analyze = server
            .mock("POST", "/analyze-lite")
            .expect(0)
            .create_async()
            .await;

        let outcome = flow(&server).run("Cattle", |_| {}).await.unwrap();
        assert!(matches!(outcome, FlowOutcome::Published(ref a) if a["ual"] == "did:dkg:1"));
        analyze.assert_async().await;
    }

    #[tokio::test]
    async fn test_paywall_without_wallet() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/dkgpedia/query/Cattle")
            .with_status(402)
            .with_body(
                json!({ "accepts": [{ "maxAmountRequired": "250000", "payTo": "0xabc" }] }).to_string(),
            )
            .create_async()
            .await;

        let outcome = flow(&server).run("Cattle", |_| {}).await.unwrap();
        match outcome {
            FlowOutcome::Paywall(info) => {
                assert_eq!(info.display_price(), "25.00");
                assert_eq!(info.title, "Cattle");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_engine_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        mock_not_published(&mut server).await;
        server
            .mock("POST", "/analyze-lite")
            .with_status(200)
            .with_body(r#"{"status":"in_progress","analysis_id":"lite_1"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/progress")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"errors":["boom"]}"#)
            .create_async()
            .await;

        let outcome = flow(&server).run("Cattle", |_| {}).await.unwrap();
        assert_eq!(outcome, FlowOutcome::Failed("boom".to_string()));
    }

    #[tokio::test]
    async fn test_failed_analyze_lite_envelope_is_reported() {
        let mut server = mockito::Server::new_async().await;
        mock_not_published(&mut server).await;
        server
            .mock("POST", "/analyze-lite")
            .with_status(500)
            .with_body(
                json!({
                    "status": "error",
                    "analysis_id": "lite_1",
                    "topic": "Cattle",
                    "steps_completed": [],
                    "errors": ["Step 1 (Fetch) failed: boom"]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let scrape = server.mock("POST", "/scrape").expect(0).create_async().await;

        let outcome = flow(&server).run("Cattle", |_| {}).await.unwrap();
        assert_eq!(outcome, FlowOutcome::Failed("Step 1 (Fetch) failed: boom".to_string()));
        scrape.assert_async().await;
    }

    #[tokio::test]
    async fn test_analyze_lite_server_error_without_envelope() {
        let mut server = mockito::Server::new_async().await;
        mock_not_published(&mut server).await;
        server
            .mock("POST", "/analyze-lite")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let err = flow(&server).run("Cattle", |_| {}).await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(503));
    }

    #[tokio::test]
    async fn test_blank_topic_rejected() {
        let server = mockito::Server::new_async().await;
        let err = flow(&server).run("  ", |_| {}).await.unwrap_err();
        assert!(matches!(err, DkgError::Validation(_)));
    }
}
