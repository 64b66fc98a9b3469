//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", config_path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    check(config)?;
    if config.google.client_id.is_some() {
        println!("Google client id resolves.");
    } else {
        println!("No Google client id configured; `remindme auth login` needs --client-id.");
    }
    println!("Configuration is valid.");
    Ok(())
}

fn check(config: &ClientConfig) -> ClientResult<()> {
    config.backend_config()?;
    if config.google.client_id.is_some() {
        config.authorization_request(None)?;
    }
    Ok(())
}

/// Show where configuration and state live.
pub fn path(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    println!("config: {}", config_path.display());
    println!("token: {}", config.token_path().display());
    println!("pending: {}", config.pending_path().display());
    Ok(())
}
