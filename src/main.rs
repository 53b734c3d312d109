use anyhow::Result;
use clap::Parser;
use log::info;

use settings_nav::cli::commands;
use settings_nav::cli::{Cli, Commands};
use settings_nav::config::NavigatorConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("settings-nav.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting settings-nav");

    let config = match &cli.config {
        Some(path) => NavigatorConfig::load_from(path)?,
        None => NavigatorConfig::load()?,
    };

    match cli.command {
        Commands::Panels => commands::panels_command(&config),
        Commands::Walk(args) => commands::walk_command(config, args).await,
        Commands::Dialog(args) => commands::dialog_command(config, args).await,
        Commands::Config => commands::config_command(&config),
    }
}
