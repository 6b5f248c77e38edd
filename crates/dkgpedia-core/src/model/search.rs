//! Search result models.

use serde::{Deserialize, Serialize};

/// A row in the merged search list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub topic_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ual: Option<String>,
    /// Unverified suggestion rather than a published asset.
    #[serde(default)]
    pub is_suggestion: bool,
}

impl SearchHit {
    /// A verified knowledge-graph asset.
    pub fn verified(topic_id: impl Into<String>, title: impl Into<String>, ual: Option<String>) -> Self {
        Self {
            topic_id: topic_id.into(),
            title: title.into(),
            ual,
            is_suggestion: false,
        }
    }

    /// An unverified suggestion; the title doubles as the topic id.
    pub fn suggestion(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            topic_id: title.clone(),
            title,
            ual: None,
            is_suggestion: true,
        }
    }
}
