//! # Configuration Loader
//!
//! Reads the TOML file and maps it onto [`AppConfig`]. Defaults for missing
//! fields live in `AppConfig::from_toml`, not here.

use anyhow::Context;
use cb_core::config::AppConfig;
use std::path::PathBuf;
use tracing::debug;

const CONFIG_DIR_NAME: &str = "clipper-bookmarks";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns error if the file cannot be read, is not valid TOML, or holds a
/// value the mapping rejects (unknown backend or policy).
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))
}

/// `<user config dir>/clipper-bookmarks/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// An explicit path must load. Without one, the default path is used if the
/// file exists, otherwise built-in defaults.
pub fn resolve_config(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => load_config(path),
        _ => {
            debug!("no config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}
