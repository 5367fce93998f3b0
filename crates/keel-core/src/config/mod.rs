//! Configuration management
//!
//! `KeelConfig` aggregates the settings of every component. Sources, in
//! order: defaults, an optional TOML/YAML/JSON file, `KEEL_*` environment
//! variables. Durations use humantime strings (`"30s"`, `"5m"`).

pub mod env_loader;
pub mod file_loader;
pub mod logging_config;
pub mod model;
pub mod validation;

pub use env_loader::{apply_env_overrides, apply_overrides_from};
pub use file_loader::{load_from_file, save_to_file};
pub use logging_config::LoggingConfig;
pub use model::KeelConfig;
pub use validation::ConfigValidator;
