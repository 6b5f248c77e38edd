//! Search command.

use anyhow::Result;
use clap::Args;
use dkgpedia_core::Config;
use dkgpedia_upstream::SearchAggregator;

use crate::output;

#[derive(Args)]
pub struct SearchArgs {
    /// Free-text query
    pub query: String,

    /// Maximum number of knowledge-graph results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: SearchArgs, config: &Config) -> Result<()> {
    let query = args.query.trim();
    if query.is_empty() {
        anyhow::bail!("Query is required");
    }

    let aggregator = SearchAggregator::from_config(config)
        .with_limit(args.limit.unwrap_or(config.search_limit));
    let hits = aggregator.search(query).await;

    if args.json {
        output::print_json(&serde_json::to_value(&hits)?);
    } else {
        output::print_hits(&hits);
    }
    Ok(())
}
