//! CLI argument definitions using clap
//!
//! - keel status [--json]             # One health check, then the report
//! - keel probe <url>                 # One retrying request through the layer
//! - keel serve                       # Run the layer until SIGINT/SIGTERM
//! - keel config init|show            # Write or print the effective config

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use keel_core::config::LoggingConfig;
use keel_core::config::logging_config::{LOG_FORMATS, LOG_LEVELS};
use std::path::PathBuf;

/// Default configuration file name used across all CLI commands.
pub const DEFAULT_CONFIG_FILE: &str = "keel.toml";

#[derive(Parser, Debug)]
#[command(name = "keel")]
#[command(about = "Keel - operational resilience layer for chat bot services")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (TOML, YAML or JSON)
    #[arg(long, short, global = true, env = "KEEL_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log level; RUST_LOG takes precedence
    #[arg(long, global = true, value_parser = PossibleValuesParser::new(LOG_LEVELS))]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_parser = PossibleValuesParser::new(LOG_FORMATS))]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply `--log-level` / `--log-format` on top of the configured logging
    pub fn logging(&self, mut base: LoggingConfig) -> LoggingConfig {
        let with_target = base.with_target;
        base.merge(LoggingConfig {
            level: self.log_level.clone().unwrap_or_default(),
            format: self.log_format.clone().unwrap_or_default(),
            with_target,
        });
        base
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one health check against a fresh layer and print the report
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send one request through the retrying client
    Probe(ProbeArgs),

    /// Start the layer and run until interrupted
    Serve,

    /// Manage configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Absolute URL, or a path resolved against http.base_url
    pub url: String,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Override retry.max_retries for this request
    #[arg(long)]
    pub retries: Option<u32>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Display the effective configuration
    Show {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration (plus KEEL_* overrides) to the config path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
