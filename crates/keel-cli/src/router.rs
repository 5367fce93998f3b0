//! Command routing logic for CLI

use crate::args::{Cli, Commands, ConfigAction};
use crate::{commands, logging};
use anyhow::{Context, Result};
use keel_core::KeelConfig;

/// Load the effective configuration, set up logging and run the command
pub async fn route(cli: Cli) -> Result<()> {
    // `config init` starts from defaults rather than the file it may replace
    let source = match &cli.command {
        Commands::Config {
            action: ConfigAction::Init { .. },
        } => None,
        _ => Some(cli.config.as_path()),
    };
    let mut config = KeelConfig::load(source)
        .with_context(|| format!("Failed to load configuration from '{}'", cli.config.display()))?;
    config.logging = cli.logging(config.logging);
    logging::init(&config.logging)?;

    match cli.command {
        Commands::Status { json } => commands::status::run(config, json).await,
        Commands::Probe(args) => commands::probe::run(config, args).await,
        Commands::Serve => commands::serve::run(config).await,
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => commands::config::show(&config, &cli.config, json),
            ConfigAction::Init { force } => commands::config::init(&config, &cli.config, force),
        },
    }
}
