//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid PORT value {0:?}: expected a number in 1-65535")]
    InvalidPort(String),
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Apply environment variable overrides on top of the loaded config.
///
/// `PORT` replaces the port of the bind address; `OTLP_ENDPOINT` and
/// `OTEL_SERVICE_NAME` replace the trace export settings.
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<(), ConfigError> {
    if let Ok(port) = std::env::var("PORT") {
        let parsed: u16 = port
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        if parsed == 0 {
            return Err(ConfigError::InvalidPort(port));
        }
        config.server.bind_address = format!("0.0.0.0:{parsed}");
    }
    if let Ok(endpoint) = std::env::var("OTLP_ENDPOINT") {
        config.tracing.endpoint = endpoint;
    }
    if let Ok(name) = std::env::var("OTEL_SERVICE_NAME") {
        config.tracing.service_name = name;
    }
    Ok(())
}
