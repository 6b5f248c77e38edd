//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dkgpedia_core::Config;
use std::path::PathBuf;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to logs/dkgpedia.log)
    #[arg(long, requires = "log")]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, mut config: Config) -> Result<()> {
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let addr = config.bind_addr();
    println!();
    println!("  {} {}", "DKGPedia".cyan().bold(), "Gateway".bold());
    println!();
    println!("  {}            http://{}/api", "API".green(), addr);
    println!("  {}         http://{}/health", "Health".green(), addr);
    println!("  {}  {}", "Knowledge graph".green(), config.dkg_api_url);
    println!("  {}  {}", "Analysis engine".green(), config.analyze_api_url);
    if config.openai_api_key.is_none() {
        println!(
            "  {}",
            "OPENAI_API_KEY not set: answers are returned uncorrected".yellow()
        );
    }
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    dkgpedia_web::run_server(config).await?;

    Ok(())
}
