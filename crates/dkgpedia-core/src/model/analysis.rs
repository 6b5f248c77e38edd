//! Analysis engine models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::null_as_default;

/// A factual conflict between the two source articles.
///
/// Used by the correction pipeline as a substitution instruction:
/// `source_a_object` is replaced with `source_b_object`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub predicate: String,
    pub source_a_object: String,
    pub source_b_object: String,
}

impl Contradiction {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        source_a_object: impl Into<String>,
        source_b_object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            source_a_object: source_a_object.into(),
            source_b_object: source_b_object.into(),
        }
    }
}

/// Output of the remote analysis pipeline.
///
/// The per-step `results` payloads are kept as opaque JSON; only the few
/// paths the gateway needs are read, and every read is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps_completed: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysisResult {
    /// Parse a pipeline payload.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// True when the payload carries step results.
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// Payload of a single pipeline step (`fetch`, `triple`, ...).
    pub fn step(&self, name: &str) -> Option<&Value> {
        self.results.get(name).filter(|v| !v.is_null())
    }

    /// Contradictions reported by the triple step, in pipeline order.
    ///
    /// Entries that do not have the expected shape are skipped.
    pub fn contradictions(&self) -> Vec<Contradiction> {
        self.step("triple")
            .and_then(|t| t.get("contradictions"))
            .and_then(|c| c.get("contradictions"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Contradiction count as reported by the engine.
    pub fn contradiction_count(&self) -> Option<u64> {
        self.step("triple")?
            .get("contradictions")?
            .get("contradiction_count")?
            .as_u64()
    }

    /// Word count of one fetched source (`grokipedia` or `wikipedia`).
    pub fn word_count(&self, source: &str) -> Option<u64> {
        self.step("fetch")?.get(source)?.get("word_count")?.as_u64()
    }

    /// Average semantic similarity between the two triple sets.
    pub fn average_similarity(&self) -> Option<f64> {
        self.step("triple")?
            .get("semantic_similarity")?
            .get("average_similarity")?
            .as_f64()
    }
}
