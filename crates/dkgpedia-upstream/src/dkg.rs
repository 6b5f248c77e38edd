//! Knowledge-graph service client.
//!
//! Search, paid topic queries and asset publishing. Queries go through the
//! x402 payment gate: a 402 either becomes a paywall (no wallet) or a single
//! signed retry (wallet connected). A 402 after the signed retry is an error;
//! the client never loops on payment.

use dkgpedia_core::payment::{
    decode_payment_response, GateDecision, PaymentGate, PaymentRequired, PaymentSigner,
    X_PAYMENT_RESPONSE,
};
use dkgpedia_core::{search, Config, DkgError, DkgResult, PaymentInfo, SearchHit};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::http::{send_error, trim_base, UpstreamResponse};

const SERVICE: &str = "knowledge graph";

/// Publishing is slow; the client allows this long before giving up.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Result of querying a topic.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The asset, plus the decoded settlement receipt when a payment was made.
    Found { asset: Value, receipt: Option<Value> },
    NotFound,
    Paywall(PaymentInfo),
}

/// Knowledge-graph HTTP client.
#[derive(Clone)]
pub struct DkgClient {
    base_url: String,
    client: reqwest::Client,
    publish_client: reqwest::Client,
}

impl DkgClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_publish_timeout(base_url, DEFAULT_PUBLISH_TIMEOUT)
    }

    pub fn with_publish_timeout(base_url: &str, publish_timeout: Duration) -> Self {
        let publish_client = reqwest::Client::builder()
            .timeout(publish_timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: trim_base(base_url),
            client: reqwest::Client::new(),
            publish_client,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_publish_timeout(&config.dkg_api_url, config.publish_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Raw keyword search response.
    pub async fn search(&self, keyword: &str, limit: usize) -> DkgResult<UpstreamResponse> {
        let response = self
            .client
            .get(format!("{}/api/dkgpedia/search", self.base_url))
            .query(&[("keyword", keyword), ("limit", limit.to_string().as_str())])
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        UpstreamResponse::read(SERVICE, response).await
    }

    /// Verified assets matching `keyword`.
    pub async fn search_hits(&self, keyword: &str, limit: usize) -> DkgResult<Vec<SearchHit>> {
        let body = self.search(keyword, limit).await?.into_json(SERVICE)?;
        let hits = search::parse_search_response(&body);
        debug!(keyword, count = hits.len(), "Knowledge graph search");
        Ok(hits)
    }

    /// Raw topic query with caller-supplied headers, for relaying.
    pub async fn query_raw(
        &self,
        topic_id: &str,
        headers: &[(String, String)],
    ) -> DkgResult<UpstreamResponse> {
        let mut request = self.client.get(self.query_url(topic_id));
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await.map_err(|e| send_error(SERVICE, e))?;
        UpstreamResponse::read(SERVICE, response).await
    }

    fn query_url(&self, topic_id: &str) -> String {
        format!(
            "{}/api/dkgpedia/query/{}",
            self.base_url,
            urlencoding::encode(topic_id)
        )
    }

    /// Query a topic, paying through `signer` if the asset is priced.
    pub async fn query(
        &self,
        topic_id: &str,
        signer: Option<&dyn PaymentSigner>,
    ) -> DkgResult<QueryOutcome> {
        let response = self.query_raw(topic_id, &[]).await?;
        if response.status != 402 {
            return Self::query_outcome(topic_id, response);
        }

        let required = PaymentRequired::from_body(&response.json()?)?;
        let (requirements, signer) =
            match (PaymentGate::decide(&required, topic_id, signer.is_some(), false)?, signer) {
                (GateDecision::ShowPaywall(info), _) => {
                    info!(topic_id, price = %info.display_price(), "Topic is behind a paywall");
                    return Ok(QueryOutcome::Paywall(info));
                }
                (GateDecision::PayAndRetry(requirements), Some(signer)) => (requirements, signer),
                _ => return Err(DkgError::PaymentRejected),
            };

        let headers: Vec<(String, String)> = signer
            .sign(&requirements)
            .await?
            .pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        info!(topic_id, network = %requirements.network, "Retrying query with payment");

        let paid = self.query_raw(topic_id, &headers).await?;
        if paid.status == 402 {
            let required = PaymentRequired::from_body(&paid.json()?)?;
            if PaymentGate::decide(&required, topic_id, true, true)? == GateDecision::Rejected {
                warn!(topic_id, "Payment was refused after signing");
            }
            return Err(DkgError::PaymentRejected);
        }
        Self::query_outcome(topic_id, paid)
    }

    fn query_outcome(topic_id: &str, response: UpstreamResponse) -> DkgResult<QueryOutcome> {
        if response.status == 404 {
            debug!(topic_id, "Topic not in knowledge graph");
            return Ok(QueryOutcome::NotFound);
        }

        let receipt = response
            .header(X_PAYMENT_RESPONSE)
            .and_then(|h| match decode_payment_response(h) {
                Ok(receipt) => Some(receipt),
                Err(e) => {
                    warn!(topic_id, error = %e, "Unreadable payment receipt");
                    None
                }
            });
        let asset = response.into_json(SERVICE)?;
        Ok(QueryOutcome::Found { asset, receipt })
    }

    /// Publish an asset. Uses the long-timeout client.
    pub async fn publish(&self, body: &Value) -> DkgResult<UpstreamResponse> {
        info!("Publishing asset to knowledge graph");
        let response = self
            .publish_client
            .post(format!("{}/api/dkgpedia/publish", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        UpstreamResponse::read(SERVICE, response).await
    }
}
