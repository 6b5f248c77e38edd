//! Search result merging.

use serde_json::Value;

use crate::model::SearchHit;

/// Default number of knowledge-graph hits requested.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Verified knowledge-graph hits first, in their own order, then suggestions.
pub fn merge(verified: Vec<SearchHit>, suggestions: Vec<String>) -> Vec<SearchHit> {
    let mut merged: Vec<SearchHit> = verified
        .into_iter()
        .map(|mut hit| {
            hit.is_suggestion = false;
            hit
        })
        .collect();

    merged.extend(
        suggestions
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(SearchHit::suggestion),
    );
    merged
}

/// Extract hits from a knowledge-graph search response.
///
/// Accepts a bare array or an object holding it under `results`, `assets` or
/// `data`. Items without any usable identifier are skipped.
pub fn parse_search_response(body: &Value) -> Vec<SearchHit> {
    let items = match body {
        Value::Array(items) => Some(items),
        Value::Object(_) => ["results", "assets", "data"]
            .iter()
            .find_map(|k| body.get(*k).and_then(Value::as_array)),
        _ => None,
    };

    items
        .map(|items| items.iter().filter_map(parse_hit).collect())
        .unwrap_or_default()
}

fn parse_hit(item: &Value) -> Option<SearchHit> {
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| item.get(*k).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };

    let topic_id = text(&["topicId", "topic_id", "topic", "id"])?;
    let title = text(&["title", "name"]).unwrap_or_else(|| topic_id.clone());
    let ual = text(&["ual", "UAL"]);
    Some(SearchHit::verified(topic_id, title, ual))
}

/// Extract suggestion strings from a suggestion-service response.
pub fn parse_suggestions(body: &Value) -> Vec<String> {
    body.get("suggestions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
