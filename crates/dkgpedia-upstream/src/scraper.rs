//! Article scraper client.

use dkgpedia_core::{Config, DkgError, DkgResult};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::http::{send_error, trim_base, UpstreamResponse};

const SERVICE: &str = "article scraper";

/// Client for the Grokipedia scraping service.
#[derive(Clone)]
pub struct ScraperClient {
    base_url: String,
    client: reqwest::Client,
}

impl ScraperClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: trim_base(base_url),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.scraper_url())
    }

    /// Raw scrape response for a search query.
    pub async fn scrape(&self, query: &str) -> DkgResult<UpstreamResponse> {
        info!(query, "Scraping article");
        let response = self
            .client
            .post(format!("{}/scrape", self.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;
        UpstreamResponse::read(SERVICE, response).await
    }

    /// Plain text of the article for `query`.
    pub async fn fetch_article_text(&self, query: &str) -> DkgResult<String> {
        let body = self.scrape(query).await?.into_json(SERVICE)?;
        let text = article_text(&body)
            .ok_or_else(|| DkgError::validation(format!("scraper returned no content for '{query}'")))?;
        debug!(query, chars = text.len(), "Article fetched");
        Ok(text)
    }
}

/// `content_text` of a scrape response, if present and non-blank.
pub fn article_text(body: &Value) -> Option<String> {
    body.get("content_text")
        .or_else(|| body.get("data").and_then(|d| d.get("content_text")))
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_fetch_article_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/scrape")
            .match_body(Matcher::Json(json!({ "query": "Cattle" })))
            .with_status(200)
            .with_body(r#"{"title":"Cattle","content_text":"Cattle are large quadrupedal ungulates.","word_count":5}"#)
            .create_async()
            .await;

        let text = ScraperClient::new(&server.url())
            .fetch_article_text("Cattle")
            .await
            .unwrap();
        assert_eq!(text, "Cattle are large quadrupedal ungulates.");
    }

    #[test]
    fn test_article_text_missing() {
        assert!(article_text(&json!({ "content_text": "  " })).is_none());
        assert!(article_text(&json!({ "error": "not found" })).is_none());
        assert_eq!(
            article_text(&json!({ "data": { "content_text": "Nested." } })).as_deref(),
            Some("Nested.")
        );
    }
}
