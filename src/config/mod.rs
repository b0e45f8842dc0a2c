mod init;
mod schema;

pub use init::write_default_config;
pub use schema::{Config, PersistenceConfig, SinkKind};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/credit-projector/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("credit-projector")
}

/// Get the default config file path (~/.config/credit-projector/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// With no explicit path a missing default config file yields the defaults.
/// An explicit path that does not exist is an error.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!("Failed to parse config: invalid YAML in {}", config_path.display())
    })?;

    Ok(config)
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref user_id) = config.user_id {
        if user_id.trim().is_empty() {
            errors.push("user_id: must not be empty".to_string());
        }
    }

    if let Some(ref delay) = config.reveal_delay {
        if let Err(e) = humantime::parse_duration(delay) {
            errors.push(format!("reveal_delay: invalid duration '{}' - {}", delay, e));
        }
    }

    let persistence = &config.persistence;

    if let Some(ref timeout) = persistence.timeout {
        if let Err(e) = humantime::parse_duration(timeout) {
            errors.push(format!(
                "persistence.timeout: invalid duration '{}' - {}",
                timeout, e
            ));
        }
    }

    if let Some(ref collection) = persistence.collection {
        if collection.trim().is_empty() || collection.contains('/') {
            errors.push(format!(
                "persistence.collection: invalid name '{}'",
                collection
            ));
        }
    }

    if persistence.sink == SinkKind::Remote {
        match persistence.endpoint.as_deref() {
            None => errors.push("persistence.endpoint: required for the remote sink".to_string()),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                errors.push(format!(
                    "persistence.endpoint: must be an http(s) URL, got '{}'",
                    url
                ));
            }
            Some(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
