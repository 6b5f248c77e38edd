//! Article, suggestion and aggregated search routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::Response,
    Json,
};
use dkgpedia_core::SearchHit;
use serde::{Deserialize, Serialize};

use super::relay_body;
use crate::error::{required, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct QueryRequest {
    pub query: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

/// `POST /api/grokipedia`
pub async fn grokipedia(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let query = required(req.query, "Query is required")?;
    Ok(relay_body(state.scraper.scrape(&query).await?))
}

/// `POST /api/suggestions`
pub async fn suggestions(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let query = required(req.query, "Query is required")?;
    Ok(relay_body(state.suggestions.suggest_raw(&query).await?))
}

/// `GET /api/search?q=&limit=`
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params?;
    let query = required(params.q, "Query is required")?;
    let aggregator = match params.limit {
        Some(limit) if limit > 0 => state.search.clone().with_limit(limit),
        _ => state.search.clone(),
    };
    let results = aggregator.search(&query).await;
    Ok(Json(SearchResponse { query, results }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_query_required() {
        let app = router("http://127.0.0.1:9");
        for uri in ["/api/grokipedia", "/api/suggestions"] {
            let (status, _, body) = send(app.clone(), post_json(uri, json!({ "query": "" }))).await;
            assert_eq!(status, 400, "{uri}");
            assert_eq!(body["error"], "Query is required");
        }
        let (status, _, _) = send(app, get("/api/search")).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_grokipedia_relays_scrape() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/scrape")
            .match_body(Matcher::PartialJson(json!({ "query": "Cattle" })))
            .with_status(200)
            .with_body(r#"{"content_text":"Cattle are large ruminants.","title":"Cattle"}"#)
            .create_async()
            .await;

        let (status, _, body) = send(
            router(&server.url()),
            post_json("/api/grokipedia", json!({ "query": "Cattle" })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["content_text"], "Cattle are large ruminants.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_degrades_when_suggestions_fail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/dkgpedia/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results":[{"topicId":"Cattle","title":"Cattle","ual":"did:dkg:1"}]}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/suggestions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let (status, _, body) = send(router(&server.url()), get("/api/search?q=cat&limit=3")).await;
        assert_eq!(status, 200);
        assert_eq!(body["query"], "cat");
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
        assert_eq!(body["results"][0]["topic_id"], "Cattle");
        assert_eq!(body["results"][0]["is_suggestion"], false);
    }
}
