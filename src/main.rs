use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use wertigo::{Catalog, VERSION, WertigoConfig, logging, web};

#[derive(Parser, Debug)]
#[command(name = "wertigo")]
#[command(version, about = "Philippine travel discovery server")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the configured one
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        WertigoConfig::load_from_path(cli.config).context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.logging, cli.verbose);
    info!("Starting WerTigo {}", VERSION);

    let catalog = Catalog::load(config.catalog.path.as_deref()).context("Failed to load catalog")?;

    web::run(&config, catalog).await
}
