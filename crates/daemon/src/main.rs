//! diagmon - Monitoring agent entry point
//! Runs collection rule actions against monitored endpoints

mod cli;
mod commands;
mod logging;
mod settings;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands, ConfigCommands};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Collect(options) => {
            info!("diagmon v{} starting...", VERSION);
            commands::collect::run(options).await
        }
        Commands::Config {
            command: ConfigCommands::Show { options, level },
        } => commands::config_show::run(options, level),
    }
}
