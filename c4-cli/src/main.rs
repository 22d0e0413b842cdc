use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use connect4_client::error::logging;
use connect4_client::{ClientConfig, ClientContext, Dispatcher, EthersChain};

mod config;
mod repl;

use config::{Overrides, ReplConfig};
use repl::TerminalConsole;

#[derive(Parser)]
#[command(name = "c4")]
#[command(about = "Deploy and play Connect4 contracts on an Ethereum node")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init_from_env().map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    cli.overrides.apply(&mut config);
    config.validate()?;

    if let Some(path) = &cli.write_config {
        config.to_file(path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let url = config.network.provider_url.clone();
    let chain = EthersChain::connect(&url, config.network.confirmations)
        .await
        .with_context(|| format!("Could not connect to {}", url))?;

    let console = TerminalConsole::new(ReplConfig::default())?;
    console.display_welcome(&url);

    let ctx = ClientContext::connect(Arc::new(chain), Arc::new(console), config).await?;
    info!(account = ?ctx.account, provider = %url, "Session started");

    Dispatcher::new(ctx).run().await?;
    Ok(())
}
