// src/core/paths.rs

use crate::{
    constants::{CONFIG_DIR_NAME, DEFAULT_CONFIG_FILENAME},
    core::config_loader::ConfigError,
};
use std::path::PathBuf;

/// Returns the default config location (`~/.config/backup-starter/config.yaml` on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(DEFAULT_CONFIG_FILENAME))
}

/// Determines which configuration file to load.
///
/// An explicit path has `~` and environment variables expanded. Without one,
/// the default location is used, but only if a file exists there.
pub fn resolve_config_path(explicit: Option<&str>) -> Result<PathBuf, ConfigError> {
    if let Some(raw) = explicit {
        return expand_path(raw);
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            log::debug!("Using default config '{}'", path.display());
            Ok(path)
        }
        Some(path) => Err(ConfigError::NoConfigFile(path.display().to_string())),
        None => Err(ConfigError::NoConfigFile(format!(
            "<config dir>/{}/{}",
            CONFIG_DIR_NAME, DEFAULT_CONFIG_FILENAME
        ))),
    }
}

/// Expands `~` and `$VAR` references in a user supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf, ConfigError> {
    let expanded = shellexpand::full(raw).map_err(|e| ConfigError::PathExpansion {
        path: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}
