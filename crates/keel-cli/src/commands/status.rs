//! `keel status`

use crate::console::CliConsole;
use anyhow::Result;
use keel_core::{KeelConfig, ResilienceLayer};

/// Run one health check on a fresh layer and print the result
pub async fn run(config: KeelConfig, json: bool) -> Result<()> {
    let layer = ResilienceLayer::new(config)?;
    layer.monitor().run_health_check().await;
    let status = layer.monitor().status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let console = CliConsole::new(true);
        console.print_health(status.status);
        println!();
        print!("{}", layer.monitor().report());
    }

    layer.shutdown().await;
    Ok(())
}
