use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{get_config_path, Config, PersistenceConfig, SinkKind};

fn default_config() -> Config {
    Config {
        user_id: None,
        reveal_delay: Some("800ms".to_string()),
        persistence: PersistenceConfig {
            sink: SinkKind::Local,
            ..PersistenceConfig::default()
        },
    }
}

const HEADER: &str = "\
# credit-projector configuration
#
# persistence.sink: local (history file), remote (document store over HTTP) or none.
# For the remote sink set persistence.endpoint; a bearer token is read from
# CREDIT_PROJECTOR_SINK_TOKEN when present.
";

/// Write a starter config file. Returns the path written.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = path.unwrap_or_else(get_config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    let yaml = serde_saphyr::to_string(&default_config())
        .context("Failed to serialize default config")?;

    fs::write(&config_path, format!("{}{}", HEADER, yaml))
        .with_context(|| format!("Failed to write config file at {}", config_path.display()))?;

    Ok(config_path)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory at {}", dir.display()))?;
    }
    Ok(())
}
