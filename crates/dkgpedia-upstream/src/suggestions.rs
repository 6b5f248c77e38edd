//! Topic suggestion service client.

use dkgpedia_core::{search, Config, DkgResult};
use serde_json::json;

use crate::http::{send_error, trim_base, UpstreamResponse};

const SERVICE: &str = "suggestion service";

#[derive(Clone)]
pub struct SuggestionsClient {
    base_url: String,
    client: reqwest::Client,
}

impl SuggestionsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: trim_base(base_url),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.suggestions_url())
    }

    pub async fn suggest_raw(&self, query: &str) -> DkgResult<UpstreamResponse> {
        let response = self
            .client
            .post(format!("{}/suggestions", self.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        UpstreamResponse::read(SERVICE, response).await
    }

    pub async fn suggest(&self, query: &str) -> DkgResult<Vec<String>> {
        let body = self.suggest_raw(query).await?.into_json(SERVICE)?;
        Ok(search::parse_suggestions(&body))
    }
}
