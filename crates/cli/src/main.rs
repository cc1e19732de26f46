//! eduform command-line entry point.
//!
//! Logging goes to stderr as JSON so command output on stdout stays clean.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use eduform_core::AppConfig;

mod args;
mod commands;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = args::Cli::parse();
    let config = AppConfig::load()?;
    tracing::debug!(db_path = %config.db_path.display(), api = %config.api_base_url, "configuration loaded");

    let app = commands::App::open(config, cli.json).await?;
    app.run(cli.command).await
}
