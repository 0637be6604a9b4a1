use anyhow::{Context, Result};
use clap::Parser;
use client_core::{ClientConfig, SrsClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod drafts;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Cli::parse();

    let config = ClientConfig::load(args.config.as_deref(), args.server_url.as_deref())
        .context("failed to resolve server configuration")?;
    info!(server_url = %config.server_url, "srs-admin starting");

    let client = SrsClient::new(&config);
    commands::run(&client, args.command).await
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
