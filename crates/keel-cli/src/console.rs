//! CLI console utilities

use colored::*;
use keel_core::telemetry::HealthState;

/// CLI console for formatted output
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.len()).dimmed());
    }

    /// Print indented, dimmed lines, at most `limit` of them
    pub fn print_block(&self, text: &str, limit: usize) {
        for line in text.lines().take(limit) {
            println!("    {}", line.dimmed());
        }
        if text.lines().count() > limit {
            println!("    {} (output truncated)", "...".dimmed());
        }
    }

    /// Print a one-line, colored health verdict
    pub fn print_health(&self, state: HealthState) {
        let label = state.as_str().to_uppercase();
        let label = match state {
            HealthState::Healthy => label.green().bold(),
            HealthState::Warning => label.yellow().bold(),
            HealthState::Critical => label.red().bold(),
        };
        println!("{} {}", "Health:".bold(), label);
    }
}
