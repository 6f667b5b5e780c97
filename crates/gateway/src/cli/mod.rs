pub mod config;
pub mod doctor;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gw_domain::config::Config as GwConfig;

/// Voice-AI Call Gateway control plane.
#[derive(Parser)]
#[command(name = "voice-ai-gateway", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Run startup diagnostics without starting the server.
    Doctor,
    /// Inspect or validate the configuration file.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Print the gateway's version.
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Validate `sip.yaml` and print any errors/warnings.
    Validate,
    /// Print the effective (env-substituted) configuration as YAML.
    Show,
}

/// Path to the configuration file, overridable via `GW_CONFIG`
/// (default `sip.yaml`), mirroring `sa_gateway::cli::load_config`'s
/// `SA_CONFIG` convention.
pub fn config_path() -> PathBuf {
    std::env::var("GW_CONFIG").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("sip.yaml"))
}

pub fn load_config() -> anyhow::Result<(GwConfig, PathBuf)> {
    let path = config_path();
    if path.exists() {
        let config = GwConfig::load_from_file(&path)
            .with_context(|| format!("loading configuration from {}", path.display()))?;
        Ok((config, path))
    } else {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
        Ok((GwConfig::default(), path))
    }
}
