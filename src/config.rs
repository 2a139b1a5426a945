//! Configuration file support for bomgraph.
//!
//! Provides YAML-based configuration through `bomgraph.config.yml` files,
//! including data structures, file loading, and validation.

use bomgraph::shared::error::SbomError;
use bomgraph::shared::Result;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "bomgraph.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    #[serde(default)]
    pub disabled_analyzers: Vec<String>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, serde_yaml_ng::Value>,
}

impl ConfigFile {
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.unknown_fields.keys().map(String::as_str).collect()
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|e| SbomError::ConfigError {
        path: path.to_path_buf(),
        details: format!("Failed to read config file: {}", e),
    })?;

    // An empty file deserializes to a YAML null
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    let config: ConfigFile =
        serde_yaml_ng::from_str(&content).map_err(|e| SbomError::ConfigError {
            path: path.to_path_buf(),
            details: format!("Failed to parse config file: {}", e),
        })?;

    validate_config(&config).map_err(|details| SbomError::ConfigError {
        path: path.to_path_buf(),
        details,
    })?;

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.is_file() {
        return Ok(None);
    }

    tracing::debug!("Using configuration {}", config_path.display());
    load_config_from_path(&config_path).map(Some)
}

fn validate_config(config: &ConfigFile) -> std::result::Result<(), String> {
    if config.metadata.keys().any(|key| key.trim().is_empty()) {
        return Err("metadata keys must not be empty".to_string());
    }
    if let Some(index) = config.exclude_paths.iter().position(|p| p.trim().is_empty()) {
        return Err(format!("exclude_paths[{}] must not be empty", index));
    }
    if let Some(index) = config
        .disabled_analyzers
        .iter()
        .position(|a| a.trim().is_empty())
    {
        return Err(format!("disabled_analyzers[{}] must not be empty", index));
    }
    Ok(())
}
