//! Answer aggregate held per topic.

use serde::{Deserialize, Serialize};

use super::analysis::AnalysisResult;

/// Cache key for a topic's answer.
pub fn cache_key(topic: &str) -> String {
    format!("answer_{}", topic)
}

/// Original article, its corrected rendition and the analysis behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerData {
    pub original_content: String,
    pub corrected_content: String,
    pub analysis_result: AnalysisResult,
    pub topic: String,
}

impl AnswerData {
    pub fn cache_key(&self) -> String {
        cache_key(&self.topic)
    }

    /// True when the correction pipeline changed the article.
    pub fn has_corrections(&self) -> bool {
        self.original_content != self.corrected_content
    }
}
