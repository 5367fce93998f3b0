//! Keel
//!
//! Operational resilience layer for long-running chat bot services. This crate
//! re-exports [`keel_core`]; the `keel` binary lives in `crates/keel-cli`.
//!
//! ```no_run
//! use keel::{KeelConfig, RateLimitScope, ResilienceLayer};
//!
//! # async fn run() -> keel::KeelResult<()> {
//! let layer = ResilienceLayer::new(KeelConfig::load(None)?)?;
//! layer.start();
//!
//! let reply = layer
//!     .dispatch("actor-1", "projects", RateLimitScope::Api, || async {
//!         layer.client().get("/api/projects").await
//!     })
//!     .await;
//! if let Err(failure) = reply {
//!     println!("{}", failure.user_message());
//! }
//!
//! layer.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub use keel_core::*;
