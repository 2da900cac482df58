//! # Config Loader
//!
//! Reads the configuration document from disk, parses it according to its file
//! extension and validates it before anything is executed. Validation builds the
//! global [`ActionRegistry`] and resolves every action of every option, so a
//! broken reference is reported at load time and never halfway through a run.
use crate::{
    core::resolver::{self, ActionRegistry},
    models::{Action, BackupConfig},
};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not open config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Syntax error in YAML config '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Syntax error in JSON config '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Syntax error in TOML config '{path}': {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("No config file given and no default config found at '{0}'.")]
    NoConfigFile(String),
    #[error("Config path '{path}' could not be expanded: {reason}")]
    PathExpansion { path: String, reason: String },
    #[error("Config has no options.")]
    MissingOptions,
    #[error("Global action '{0}' is defined more than once.")]
    DuplicateAction(String),
    #[error("Action '{action}' has an empty '{field}' command.")]
    EmptyCommand { action: String, field: &'static str },
    #[error("Action '{action}' of option '{option}' not found in global actions.")]
    UnknownAction { action: String, option: String },
}

/// The document formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension. Anything unknown is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// A parsed and validated configuration, together with its immutable action registry.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BackupConfig,
    pub registry: ActionRegistry,
}

/// Reads, parses and validates the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    log::debug!("Loading config from '{}'", path.display());
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_from_str(&content, ConfigFormat::from_path(path), &path.display().to_string())
}

/// Parses and validates a configuration document. `origin` only appears in error messages.
pub fn load_from_str(
    content: &str,
    format: ConfigFormat,
    origin: &str,
) -> Result<LoadedConfig, ConfigError> {
    let config = parse(content, format, origin)?;
    let registry = validate(&config)?;
    log::debug!(
        "Config '{}' loaded: {} option(s), {} global action(s)",
        origin,
        config.options.len(),
        registry.len()
    );
    Ok(LoadedConfig { config, registry })
}

fn parse(content: &str, format: ConfigFormat, origin: &str) -> Result<BackupConfig, ConfigError> {
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| ConfigError::Yaml {
            path: origin.to_string(),
            source: e,
        }),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| ConfigError::Json {
            path: origin.to_string(),
            source: e,
        }),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: origin.to_string(),
            source: e,
        }),
    }
}

/// Checks the document and builds the registry.
///
/// Fails on: no options, duplicate global action names, empty commands, and
/// references that resolve to nothing.
pub fn validate(config: &BackupConfig) -> Result<ActionRegistry, ConfigError> {
    if config.options.is_empty() {
        return Err(ConfigError::MissingOptions);
    }

    let registry = ActionRegistry::from_definitions(&config.actions)?;
    for action in registry.iter() {
        check_commands(action)?;
    }

    for option in &config.options {
        for action in resolver::resolve_option(option, &registry)? {
            check_commands(&action)?;
        }
        if option.backup.as_ref().is_some_and(|c| c.is_empty()) {
            return Err(ConfigError::EmptyCommand {
                action: option.name.clone(),
                field: "backup",
            });
        }
    }

    Ok(registry)
}

fn check_commands(action: &Action) -> Result<(), ConfigError> {
    if action.setup.is_empty() {
        return Err(ConfigError::EmptyCommand {
            action: action.name.clone(),
            field: "open",
        });
    }
    if action.cleanup.as_ref().is_some_and(|c| c.is_empty()) {
        return Err(ConfigError::EmptyCommand {
            action: action.name.clone(),
            field: "close",
        });
    }
    Ok(())
}
