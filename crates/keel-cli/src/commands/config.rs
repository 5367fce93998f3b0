//! Configuration management commands

use crate::console::CliConsole;
use anyhow::{Result, bail};
use keel_core::KeelConfig;
use keel_core::config::save_to_file;
use std::path::Path;

/// Print the effective configuration (file, then `KEEL_*` overrides)
pub fn show(config: &KeelConfig, path: &Path, json: bool) -> Result<()> {
    let console = CliConsole::new(true);

    console.print_header("Configuration");
    if path.exists() {
        console.success(&format!("Loaded configuration from: {}", path.display()));
    } else {
        console.warn(&format!("Configuration file not found: {}", path.display()));
        console.info("Using default configuration");
    }
    println!();

    let rendered = if json {
        config.to_json_string()?
    } else {
        config.to_toml_string()?
    };
    println!("{}", rendered);
    Ok(())
}

/// Write `config` as TOML to `path`
pub fn init(config: &KeelConfig, path: &Path, force: bool) -> Result<()> {
    let console = CliConsole::new(true);

    console.print_header("Configuration Initialization");

    if path.extension().and_then(|e| e.to_str()) != Some("toml") {
        bail!(
            "config init writes TOML; choose a .toml path instead of '{}'",
            path.display()
        );
    }
    if path.exists() && !force {
        console.error(&format!("Configuration file already exists: {}", path.display()));
        console.info("Use --force to overwrite");
        bail!("Configuration file already exists");
    }

    save_to_file(config, path)?;
    console.success(&format!("Created configuration file: {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_core::config::load_from_file;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keel.toml");
        let mut config = KeelConfig::default();
        config.rate_limits.ai.max_requests = 3;

        init(&config, &path, false).unwrap();

        let loaded = load_from_file(&path).unwrap();
        assert_eq!(loaded.rate_limits.ai.max_requests, 3);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keel.toml");
        std::fs::write(&path, "[session]\nmax_conversations = 7\n").unwrap();

        assert!(init(&KeelConfig::default(), &path, false).is_err());
        assert_eq!(load_from_file(&path).unwrap().session.max_conversations, 7);

        init(&KeelConfig::default(), &path, true).unwrap();
        assert_eq!(load_from_file(&path).unwrap().session.max_conversations, 1000);
    }

    #[test]
    fn test_init_requires_toml_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keel.json");
        assert!(init(&KeelConfig::default(), &path, false).is_err());
        assert!(!path.exists());
    }
}
