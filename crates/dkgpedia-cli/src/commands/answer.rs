//! Answer command: resolve a topic end to end.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;
use dkgpedia_core::{Config, PaymentInfo};
use dkgpedia_upstream::{AnswerFlow, FlowOutcome};
use std::sync::Arc;

use super::asset::signer_from_config;
use crate::output;

#[derive(Args)]
pub struct AnswerArgs {
    /// Topic to resolve
    pub topic: String,

    /// Also print the uncorrected article
    #[arg(long)]
    pub original: bool,

    /// Pay without asking when the topic is priced
    #[arg(short, long)]
    pub yes: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: AnswerArgs, config: &Config) -> Result<()> {
    let flow = AnswerFlow::from_config(config);
    let mut outcome = run(&flow, &args.topic).await?;

    if let FlowOutcome::Paywall(info) = &outcome {
        output::print_paywall(info);
        println!();

        if config.payment_header.is_none() {
            println!("{}", "Set DKGPEDIA_PAYMENT_HEADER to connect a wallet.".dimmed());
            return Ok(());
        }
        if !args.yes && !confirm_payment(info)? {
            println!("{}", "Payment cancelled.".dimmed());
            return Ok(());
        }

        let signer = signer_from_config(config)?;
        let paying = AnswerFlow::from_config(config).with_signer(Arc::new(signer));
        outcome = run(&paying, &args.topic).await?;
    }

    match outcome {
        FlowOutcome::Cached(answer) | FlowOutcome::Answered(answer) => {
            if args.json {
                output::print_json(&serde_json::to_value(&answer)?);
            } else {
                output::print_answer(&answer, args.original);
            }
        }
        FlowOutcome::Published(asset) => {
            println!("{} {} is published in the knowledge graph", "✓".green().bold(), args.topic.cyan());
            println!();
            output::print_json(&asset);
        }
        FlowOutcome::Paywall(info) => {
            output::print_paywall(&info);
            anyhow::bail!("Topic is still behind a paywall");
        }
        FlowOutcome::Failed(message) => anyhow::bail!("Analysis failed: {}", message),
        FlowOutcome::Stalled { attempts } => {
            anyhow::bail!("Analysis did not finish after {} polls; try `dkgpedia progress` later", attempts)
        }
    }
    Ok(())
}

async fn run(flow: &AnswerFlow, topic: &str) -> Result<FlowOutcome> {
    let spinner = output::spinner(&format!("Resolving {}", topic));
    let outcome = flow
        .run(topic, |snapshot| spinner.set_message(output::snapshot_message(snapshot)))
        .await;
    spinner.finish_and_clear();
    Ok(outcome?)
}

fn confirm_payment(info: &PaymentInfo) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(format!(
            "Pay ${} to {} for \"{}\"?",
            info.display_price(),
            info.wallet_address,
            info.title
        ))
        .default(false)
        .interact()?)
}
