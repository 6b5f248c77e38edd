//! Contradiction-driven article correction.
//!
//! Given an article and the contradictions found between it and a reference
//! source, every paragraph mentioning a contradicted term is handed to a
//! language model, one substitution at a time, and the rewritten paragraph is
//! spliced back into the article.

pub mod paragraph;
pub mod substitution;

pub use paragraph::split_paragraphs;
pub use substitution::SubstitutionMap;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::DkgResult;
use crate::model::Contradiction;

/// Maximum number of contradictions accepted per request.
pub const MAX_CONTRADICTIONS: usize = 10;

/// Rewrites a paragraph, replacing one term with another.
#[async_trait]
pub trait Corrector: Send + Sync {
    /// Replace every occurrence of `old` with `new` in `paragraph`, leaving
    /// everything else verbatim, and return only the modified text.
    async fn replace_term(&self, paragraph: &str, old: &str, new: &str) -> DkgResult<String>;
}

/// Result of one correction run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionReport {
    pub original_content: String,
    pub corrected_content: String,
    /// Contradictions accepted as input (after the cap), not edits made.
    pub corrections_applied: usize,
    /// Distinct paragraphs that were sent to the corrector.
    pub paragraphs_sent: usize,
    /// Corrector calls issued.
    pub corrector_calls: usize,
}

/// Correction pipeline settings.
#[derive(Debug, Clone)]
pub struct CorrectionPipeline {
    max_contradictions: usize,
}

impl Default for CorrectionPipeline {
    fn default() -> Self {
        Self {
            max_contradictions: MAX_CONTRADICTIONS,
        }
    }
}

impl CorrectionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_contradictions(mut self, max: usize) -> Self {
        self.max_contradictions = max;
        self
    }

    /// Contradictions accepted per run; the rest are dropped.
    pub fn max_contradictions(&self) -> usize {
        self.max_contradictions
    }

    /// Paragraphs of `article` that mention at least one key, deduplicated by
    /// exact text and kept in article order.
    pub fn select_paragraphs<'a>(&self, article: &'a str, map: &SubstitutionMap) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        split_paragraphs(article)
            .into_iter()
            .filter(|p| map.matches_any(p))
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Run the pipeline. Corrector failures never fail the run.
    pub async fn correct<C>(
        &self,
        corrector: &C,
        article: &str,
        contradictions: &[Contradiction],
    ) -> CorrectionReport
    where
        C: Corrector + ?Sized,
    {
        let accepted = &contradictions[..contradictions.len().min(self.max_contradictions)];
        if accepted.len() < contradictions.len() {
            debug!(
                received = contradictions.len(),
                accepted = accepted.len(),
                "Contradiction list capped"
            );
        }

        let map = SubstitutionMap::from_contradictions(accepted);
        let selected = self.select_paragraphs(article, &map);

        let mut corrected = article.to_string();
        let mut calls = 0;

        for paragraph in &selected {
            let mut current = paragraph.to_string();

            for (old, new) in map.matching(paragraph) {
                calls += 1;
                match corrector.replace_term(&current, old, new).await {
                    Ok(text) if !text.trim().is_empty() => current = text,
                    Ok(_) => warn!(term = old, "Corrector returned empty text, keeping paragraph"),
                    Err(e) => warn!(term = old, error = %e, "Corrector failed, keeping paragraph"),
                }
            }

            if current != *paragraph {
                corrected = corrected.replace(*paragraph, &current);
            }
        }

        info!(
            corrections = accepted.len(),
            paragraphs = selected.len(),
            calls,
            "Correction pipeline finished"
        );

        CorrectionReport {
            original_content: article.to_string(),
            corrected_content: corrected,
            corrections_applied: accepted.len(),
            paragraphs_sent: selected.len(),
            corrector_calls: calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DkgError;
    use std::sync::Mutex;

    /// Literal, case-sensitive replacement that records every call.
    #[derive(Default)]
    struct RecordingCorrector {
        calls: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl Corrector for RecordingCorrector {
        async fn replace_term(&self, paragraph: &str, old: &str, new: &str) -> DkgResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((paragraph.to_string(), old.to_string(), new.to_string()));
            Ok(paragraph.replace(old, new))
        }
    }

    struct FailingCorrector;

    #[async_trait]
    impl Corrector for FailingCorrector {
        async fn replace_term(&self, _: &str, _: &str, _: &str) -> DkgResult<String> {
            Err(DkgError::unreachable("language model", "connection refused"))
        }
    }

    struct BlankCorrector;

    #[async_trait]
    impl Corrector for BlankCorrector {
        async fn replace_term(&self, _: &str, _: &str, _: &str) -> DkgResult<String> {
            Ok("   ".to_string())
        }
    }

    fn contradiction(old: &str, new: &str) -> Contradiction {
        Contradiction::new("cattle", "are", old, new)
    }

    #[tokio::test]
    async fn test_cattle_example() {
        let corrector = RecordingCorrector::default();
        let article = "Cattle are large quadrupedal ungulates.\n\nThey live in herds.";
        let report = CorrectionPipeline::new()
            .correct(
                &corrector,
                article,
                &[contradiction("large quadrupedal ungulates", "large artiodactyls")],
            )
            .await;

        let calls = corrector.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Cattle are large quadrupedal ungulates.");
        assert_eq!(
            report.corrected_content,
            "Cattle are large artiodactyls.\n\nThey live in herds."
        );
        assert!(report.corrected_content.ends_with("\n\nThey live in herds."));
        assert_eq!(report.corrections_applied, 1);
        assert_eq!(report.paragraphs_sent, 1);
    }

    #[tokio::test]
    async fn test_caps_at_ten() {
        let corrector = RecordingCorrector::default();
        let contradictions: Vec<Contradiction> = (0..15)
            .map(|i| contradiction(&format!("term{}x", i), &format!("fixed{}x", i)))
            .collect();
        let report = CorrectionPipeline::new()
            .correct(&corrector, "term12x and term3x appear here.", &contradictions)
            .await;

        assert_eq!(report.corrections_applied, 10);
        assert_eq!(report.corrected_content, "term12x and fixed3x appear here.");
    }

    #[tokio::test]
    async fn test_no_match_is_identity() {
        let corrector = RecordingCorrector::default();
        let article = "  Bison roam the plains.\n\n== Range ==\nNorth America.\n";
        let report = CorrectionPipeline::new()
            .correct(&corrector, article, &[contradiction("ungulates", "artiodactyls")])
            .await;

        assert_eq!(report.corrected_content, report.original_content);
        assert_eq!(report.corrected_content, article);
        assert_eq!(report.corrections_applied, 1);
        assert!(corrector.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_key_uses_last_value() {
        let corrector = RecordingCorrector::default();
        let report = CorrectionPipeline::new()
            .correct(
                &corrector,
                "Cattle are herbivores.",
                &[
                    contradiction("herbivores", "ruminants"),
                    contradiction("herbivores", "grazers"),
                ],
            )
            .await;

        let calls = corrector.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].2, "grazers");
        assert_eq!(report.corrected_content, "Cattle are grazers.");
        assert_eq!(report.corrections_applied, 2);
    }

    #[tokio::test]
    async fn test_duplicate_paragraph_corrected_once() {
        let corrector = RecordingCorrector::default();
        let article = "Cows are ungulates.\n\nMiddle.\n\nCows are ungulates.";
        let report = CorrectionPipeline::new()
            .correct(&corrector, article, &[contradiction("ungulates", "artiodactyls")])
            .await;

        assert_eq!(corrector.calls.lock().unwrap().len(), 1);
        assert_eq!(report.paragraphs_sent, 1);
        assert_eq!(
            report.corrected_content,
            "Cows are artiodactyls.\n\nMiddle.\n\nCows are artiodactyls."
        );
    }

    #[tokio::test]
    async fn test_substitutions_chain_within_paragraph() {
        let corrector = RecordingCorrector::default();
        let report = CorrectionPipeline::new()
            .correct(
                &corrector,
                "Oxen are domesticated bovines.",
                &[
                    contradiction("domesticated", "tamed"),
                    contradiction("bovines", "cattle"),
                ],
            )
            .await;

        let calls = corrector.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].0, "Oxen are tamed bovines.");
        assert_eq!(report.corrected_content, "Oxen are tamed cattle.");
    }

    #[tokio::test]
    async fn test_case_insensitive_selection() {
        let corrector = RecordingCorrector::default();
        CorrectionPipeline::new()
            .correct(
                &corrector,
                "UNGULATES graze.\n\nNothing here.",
                &[contradiction("ungulates", "artiodactyls")],
            )
            .await;

        let calls = corrector.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "UNGULATES graze.");
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_original() {
        let article = "Cattle are ungulates.\n\nMore.";
        let report = CorrectionPipeline::new()
            .correct(&FailingCorrector, article, &[contradiction("ungulates", "artiodactyls")])
            .await;
        assert_eq!(report.corrected_content, article);
        assert_eq!(report.corrector_calls, 1);

        let report = CorrectionPipeline::new()
            .correct(&BlankCorrector, article, &[contradiction("ungulates", "artiodactyls")])
            .await;
        assert_eq!(report.corrected_content, article);
    }

    #[tokio::test]
    async fn test_empty_contradictions() {
        let corrector = RecordingCorrector::default();
        let report = CorrectionPipeline::new().correct(&corrector, "Text.", &[]).await;
        assert_eq!(report.corrections_applied, 0);
        assert_eq!(report.corrected_content, "Text.");
    }
}
