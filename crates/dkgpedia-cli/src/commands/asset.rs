//! Knowledge-graph asset commands.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dkgpedia_core::payment::{PaymentSigner, StaticPaymentSigner};
use dkgpedia_core::Config;
use dkgpedia_upstream::{DkgClient, QueryOutcome};
use std::path::PathBuf;

use crate::output;

#[derive(Args)]
pub struct QueryArgs {
    /// Topic id
    pub topic_id: String,

    /// Pay with the configured X-PAYMENT header if the topic is priced
    #[arg(long)]
    pub pay: bool,
}

#[derive(Args)]
pub struct PublishArgs {
    /// JSON file holding the asset
    pub file: PathBuf,
}

pub async fn query(args: QueryArgs, config: &Config) -> Result<()> {
    let client = DkgClient::from_config(config);
    let signer = if args.pay { Some(signer_from_config(config)?) } else { None };

    let outcome = client
        .query(&args.topic_id, signer.as_ref().map(|s| s as &dyn PaymentSigner))
        .await?;

    match outcome {
        QueryOutcome::Found { asset, receipt } => {
            output::print_json(&asset);
            if let Some(receipt) = receipt {
                println!();
                println!("{}", "Payment receipt".bold());
                output::print_json(&receipt);
            }
        }
        QueryOutcome::NotFound => {
            println!("{} {} is not in the knowledge graph", "✗".red(), args.topic_id.cyan());
        }
        QueryOutcome::Paywall(info) => {
            output::print_paywall(&info);
            println!();
            println!("{}", "Re-run with --pay to unlock.".dimmed());
        }
    }
    Ok(())
}

pub async fn publish(args: PublishArgs, config: &Config) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let body: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", args.file.display()))?;

    let spinner = output::spinner("Publishing to the knowledge graph");
    let response = DkgClient::from_config(config).publish(&body).await;
    spinner.finish_and_clear();

    let value = response?.into_json("knowledge graph")?;
    let ual = value
        .get("ual")
        .or_else(|| value.pointer("/data/ual"))
        .and_then(|v| v.as_str());

    match ual {
        Some(ual) => println!("{} Published: {}", "✓".green().bold(), ual.cyan()),
        None => output::print_json(&value),
    }
    Ok(())
}

/// The CLI wallet: a pre-signed X-PAYMENT header from configuration.
pub fn signer_from_config(config: &Config) -> Result<StaticPaymentSigner> {
    let header = config
        .payment_header
        .as_deref()
        .context("DKGPEDIA_PAYMENT_HEADER is not set; no wallet connected")?;
    Ok(StaticPaymentSigner::new(header)?)
}
