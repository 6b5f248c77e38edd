//! # DKGPedia Upstream
//!
//! `reqwest` clients for every service the gateway fronts: the analysis
//! engine, the knowledge-graph service, the article scraper, the suggestion
//! service and an OpenAI-compatible language model. Also home of the
//! end-to-end answer flow that strings them together.

pub mod analysis;
pub mod dkg;
pub mod flow;
pub mod http;
pub mod openai;
pub mod scraper;
pub mod search;
pub mod suggestions;

pub use analysis::AnalysisClient;
pub use dkg::{DkgClient, QueryOutcome};
pub use flow::{AnswerFlow, FlowOutcome};
pub use http::UpstreamResponse;
pub use openai::OpenAiCorrector;
pub use scraper::ScraperClient;
pub use search::SearchAggregator;
pub use suggestions::SuggestionsClient;
