//! Progress command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dkgpedia_core::{Config, ProgressOutcome, ProgressTracker};
use dkgpedia_upstream::AnalysisClient;

use crate::output;

#[derive(Args)]
pub struct ProgressArgs {
    /// Analysis id returned by analyze-lite
    pub analysis_id: String,

    /// Seconds between polls
    #[arg(long)]
    pub interval: Option<u64>,

    /// Give up after this many polls
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

pub async fn execute(args: ProgressArgs, config: &Config) -> Result<()> {
    let tracker = ProgressTracker::new(
        args.interval
            .map(std::time::Duration::from_secs)
            .unwrap_or_else(|| config.poll_interval()),
        args.max_attempts.unwrap_or(config.max_poll_attempts),
    );
    let client = AnalysisClient::from_config(config);

    let spinner = output::spinner(&format!("Waiting for analysis {}", args.analysis_id));
    let outcome = tracker
        .track(&client, &args.analysis_id, |snapshot| {
            spinner.set_message(output::snapshot_message(snapshot))
        })
        .await;
    spinner.finish_and_clear();

    match outcome {
        ProgressOutcome::Completed(payload) => {
            println!("{} Analysis complete", "✓".green().bold());
            output::print_json(&payload);
            Ok(())
        }
        ProgressOutcome::Failed(message) => anyhow::bail!("Analysis failed: {}", message),
        ProgressOutcome::Stalled { attempts } => {
            anyhow::bail!("Analysis still running after {} polls", attempts)
        }
    }
}
