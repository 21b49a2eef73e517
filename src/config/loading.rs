//! Configuration loading functionality.
//!
//! Resolves the configuration path, creates a default file on first run, parses the TOML and
//! runs validation before handing the result to the application.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::common::constants::*;
use crate::common::utils::private_path;

const CONFIG_FILE_NAME: &str = "daylightr.toml";

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
/// Returns an error if already set.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
/// Returns None if using the default directory.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Get the configuration file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("daylightr").join(CONFIG_FILE_NAME))
}

/// Load configuration using automatic path detection.
///
/// This function will create a default configuration file if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
        log_indented!("Created default config at {}", private_path(&config_path));
    }

    load_from_path(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            private_path(&config_path)
        )
    })
}

/// Load configuration from a specific path.
///
/// This version does NOT create a default config if the path doesn't exist.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!(
            "Configuration file not found at {}",
            private_path(path)
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    parse_config(&content)
        .with_context(|| format!("Invalid configuration in {}", private_path(path)))
}

/// Parse, validate and post-process configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content).context("Failed to parse config")?;

    validate_config(&config)?;
    apply_modifications(&mut config);

    Ok(config)
}

/// Apply modifications to configuration fields (e.g., latitude capping).
/// This only modifies values, not validates them.
fn apply_modifications(config: &mut Config) {
    // Near the poles the sun may not rise or set at all
    if let Some(lat) = config.latitude
        && lat.abs() > MAXIMUM_SOLAR_LATITUDE
    {
        log_pipe!();
        log_warning!(
            "Latitude capped at {}°{} (config {:.4}°{})",
            MAXIMUM_SOLAR_LATITUDE,
            if lat >= 0.0 { "N" } else { "S" },
            lat.abs(),
            if lat >= 0.0 { "N" } else { "S" }
        );
        log_indented!("Consider manual sunrise/sunset times for more sensible curves.");
        config.latitude = Some(MAXIMUM_SOLAR_LATITUDE * lat.signum());
    }
}
