//! Concurrent search across the knowledge graph and the suggestion service.

use dkgpedia_core::search::{merge, DEFAULT_SEARCH_LIMIT};
use dkgpedia_core::{Config, SearchHit};
use tracing::{info, warn};

use crate::dkg::DkgClient;
use crate::suggestions::SuggestionsClient;

/// Fans a query out to both sources and merges the answers.
#[derive(Clone)]
pub struct SearchAggregator {
    dkg: DkgClient,
    suggestions: SuggestionsClient,
    limit: usize,
}

impl SearchAggregator {
    pub fn new(dkg: DkgClient, suggestions: SuggestionsClient) -> Self {
        Self {
            dkg,
            suggestions,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(DkgClient::from_config(config), SuggestionsClient::from_config(config))
            .with_limit(config.search_limit)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Verified hits first, then suggestions. A failing source contributes nothing.
    pub async fn search(&self, query: &str) -> Vec<SearchHit> {
        let (verified, suggestions) = tokio::join!(
            self.dkg.search_hits(query, self.limit),
            self.suggestions.suggest(query)
        );

        let verified = verified.unwrap_or_else(|e| {
            warn!(query, error = %e, "Knowledge graph search failed");
            Vec::new()
        });
        let suggestions = suggestions.unwrap_or_else(|e| {
            warn!(query, error = %e, "Suggestion lookup failed");
            Vec::new()
        });

        info!(
            query,
            verified = verified.len(),
            suggestions = suggestions.len(),
            "Search aggregated"
        );
        merge(verified, suggestions)
    }
}
