//! CLI commands

pub mod config;
pub mod probe;
pub mod serve;
pub mod status;
