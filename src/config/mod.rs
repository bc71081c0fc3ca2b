mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config).with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./inkpost.toml",
        "~/.config/inkpost/config.toml",
        "/etc/inkpost/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.storage.db_pool_size == 0 {
        anyhow::bail!("storage.db_pool_size must be greater than 0");
    }

    let fetch = &config.fetch;
    if fetch.connect_timeout_secs == 0 || fetch.request_timeout_secs == 0 {
        anyhow::bail!("Fetch timeouts must be greater than 0");
    }
    if fetch.max_image_bytes == 0 {
        anyhow::bail!("fetch.max_image_bytes must be greater than 0");
    }
    if fetch.max_batch_size == 0 {
        anyhow::bail!("fetch.max_batch_size must be greater than 0");
    }
    if fetch.batch_concurrency == 0 || fetch.batch_concurrency > fetch.max_batch_size {
        anyhow::bail!(
            "fetch.batch_concurrency must be between 1 and max_batch_size ({})",
            fetch.max_batch_size
        );
    }

    if let Some(ref dir) = config.server.static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}
