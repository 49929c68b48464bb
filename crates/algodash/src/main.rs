//! algodash - terminal control panel for a remote trading bot.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Terminal control panel for a remote trading bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ALGODASH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before any TLS connection
    algodash_ws::init_crypto();

    let args = Args::parse();

    // CLI arg > ALGODASH_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("ALGODASH_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = algodash::AppConfig::load_or_default(&config_path)?;

    algodash_telemetry::init_logging(config.log_level.as_deref())?;
    info!("Starting algodash v{}", env!("CARGO_PKG_VERSION"));
    info!(config_path = %config_path, base_url = %config.base_url, "Configuration loaded");

    let mut app = algodash::Application::new(config)?;
    app.startup().await;
    app.run().await?;

    Ok(())
}
