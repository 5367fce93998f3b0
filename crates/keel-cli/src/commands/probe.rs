//! `keel probe`: send one request through the retrying client and show what
//! the layer made of it.

use crate::args::ProbeArgs;
use crate::console::CliConsole;
use anyhow::{Context, Result, bail};
use keel_core::http::{HttpRequest, Method};
use keel_core::{KeelConfig, ResilienceLayer};
use std::time::Instant;

const BODY_PREVIEW_LINES: usize = 10;

pub async fn run(mut config: KeelConfig, args: ProbeArgs) -> Result<()> {
    let console = CliConsole::new(true);
    if let Some(retries) = args.retries {
        config.retry.max_retries = retries;
    }
    let method: Method = args
        .method
        .to_uppercase()
        .parse()
        .with_context(|| format!("Invalid HTTP method '{}'", args.method))?;

    let layer = ResilienceLayer::new(config)?;
    let policy = layer.client().policy().clone().with_on_retry(|error, attempt| {
        CliConsole::new(true).warn(&format!("Attempt {attempt} failed: {error}; retrying"));
    });

    console.print_header(&format!("{} {}", method, args.url));
    let started = Instant::now();
    let outcome = layer
        .client()
        .execute_with(HttpRequest::new(method, &args.url), &policy)
        .await;
    let elapsed = started.elapsed();

    let failure = match outcome {
        Ok(response) => {
            console.success(&format!(
                "{} after {}ms",
                response.status(),
                elapsed.as_millis()
            ));
            if !response.text().is_empty() {
                console.print_block(response.text(), BODY_PREVIEW_LINES);
            }
            None
        }
        Err(error) => {
            let classification = layer.error_handler().handle(&error, "probe");
            console.error(&classification.user_message);
            console.info(&format!(
                "Classified as {} (retryable: {})",
                classification.error_type, classification.should_retry
            ));
            Some(classification.error_type)
        }
    };

    layer.monitor().run_health_check().await;
    println!();
    print!("{}", layer.monitor().report());
    layer.shutdown().await;

    if let Some(error_type) = failure {
        bail!("Probe of {} failed ({})", args.url, error_type);
    }
    Ok(())
}
