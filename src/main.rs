use std::path::PathBuf;

use clap::Parser;
use log::info;

use peakscope::{logging, server, Profile, ServerConfig};

/// Peak detection service for pressure-time recordings.
#[derive(Parser, Debug)]
#[command(name = "peakscope", version, about)]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config and environment).
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory uploads are saved into.
    #[arg(long)]
    upload_folder: Option<PathBuf>,

    /// Deployment profile: development or production.
    #[arg(long)]
    profile: Option<Profile>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    config.apply_env()?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(folder) = cli.upload_folder {
        config.upload_folder = folder;
    }
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }

    logging::init(config.profile);
    match &cli.config {
        Some(path) => info!("loaded configuration from {}", path.display()),
        None => info!("using default configuration"),
    }

    server::serve(config).await?;
    Ok(())
}
