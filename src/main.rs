use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;
use rail_concession::{config, init_telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::config()?;
    init_telemetry(&config.observability)?;
    tracing::debug!(data_dir = %config.storage.data_dir.display(), "Configuration loaded");

    cli::commands::run(cli, config).await
}
