mod server;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use adpanel_core::{logging, Config};

use server::AdPanelServer;

/// vMix ad playlist control service
#[derive(Parser, Debug)]
#[command(name = "adpanel", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "ADPANEL_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = Config::load(cli.config.as_deref())?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("ad panel starting...");
    info!("HTTP address: {}", config.http_address());

    // 3. Assemble and run the server
    let server = AdPanelServer::new(config)?;
    server.run().await
}
