//! Application state.

use dkgpedia_core::{Config, CorrectionPipeline, Corrector};
use dkgpedia_upstream::{
    AnalysisClient, DkgClient, OpenAiCorrector, ScraperClient, SearchAggregator, SuggestionsClient,
};
use std::sync::Arc;
use tracing::warn;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analysis: AnalysisClient,
    pub dkg: DkgClient,
    pub scraper: ScraperClient,
    pub suggestions: SuggestionsClient,
    pub search: SearchAggregator,
    pub corrector: Arc<dyn Corrector>,
    pub pipeline: CorrectionPipeline,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let openai = OpenAiCorrector::from_config(&config);
        if !openai.is_configured() {
            warn!("OPENAI_API_KEY is not set; /api/answer will return articles unchanged");
        }

        Self {
            analysis: AnalysisClient::from_config(&config),
            dkg: DkgClient::from_config(&config),
            scraper: ScraperClient::from_config(&config),
            suggestions: SuggestionsClient::from_config(&config),
            search: SearchAggregator::from_config(&config),
            corrector: Arc::new(openai),
            pipeline: CorrectionPipeline::default(),
            config: Arc::new(config),
        }
    }

    /// Replace the language-model corrector.
    pub fn with_corrector(mut self, corrector: Arc<dyn Corrector>) -> Self {
        self.corrector = corrector;
        self
    }
}
