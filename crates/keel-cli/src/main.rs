//! Keel CLI application
//!
//! Host process for the resilience layer. It owns logging setup and signal
//! handling; the library never installs either.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/keel-cli
//! ```
//!
//! # Commands
//!
//! - `keel status [--json]` runs one health check against a fresh layer and
//!   prints the operator report.
//! - `keel probe <url> [-X METHOD] [--retries N]` sends one request through
//!   the retrying client and shows the classified outcome.
//! - `keel serve` starts the periodic sweeps and health checks, logs a status
//!   line every health interval, and shuts down on SIGINT/SIGTERM.
//! - `keel config init|show` writes or prints the effective configuration.
//!
//! Configuration is read from `--config` (default `keel.toml`) and `KEEL_*`
//! environment variables; `RUST_LOG` overrides the configured log level.

mod args;
mod commands;
mod console;
mod logging;
mod router;
mod signal_handler;

use args::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    router::route(cli).await
}
