//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dkgpedia_core::Config;
use std::path::PathBuf;

pub mod answer;
pub mod asset;
pub mod progress;
pub mod search;
pub mod serve;

/// DKGPedia - knowledge-asset marketplace gateway
#[derive(Parser)]
#[command(name = "dkgpedia")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file, overlaid by environment variables
    #[arg(short, long, global = true, env = "DKGPEDIA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy API server
    Serve(serve::ServeArgs),

    /// Search published assets and suggestions
    Search(search::SearchArgs),

    /// Resolve a topic: published asset, paywall or fresh corrected answer
    Answer(answer::AnswerArgs),

    /// Follow a running analysis until it finishes
    Progress(progress::ProgressArgs),

    /// Query a topic in the knowledge graph
    Query(asset::QueryArgs),

    /// Publish an asset from a JSON file
    Publish(asset::PublishArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to load configuration from the environment".to_string(),
        })?;
        tracing::debug!(?config, "Configuration loaded");

        match self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Search(args) => search::execute(args, &config).await,
            Commands::Answer(args) => answer::execute(args, &config).await,
            Commands::Progress(args) => progress::execute(args, &config).await,
            Commands::Query(args) => asset::query(args, &config).await,
            Commands::Publish(args) => asset::publish(args, &config).await,
        }
    }
}
