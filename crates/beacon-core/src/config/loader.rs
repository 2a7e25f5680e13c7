//! Configuration loading

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Configuration;
use super::validation::validate_config;

/// Merge a JSON document over `defaults`.
///
/// The merge is shallow: each top-level key present in `overlay` replaces the
/// default value for that key wholesale. `null` values are treated as absent.
/// Unknown keys are ignored.
pub fn merge_configuration(defaults: &Configuration, overlay: &str) -> Result<Configuration> {
    let overlay: Value = serde_json::from_str(overlay)
        .map_err(|e| ConfigError::ParseError(format!("malformed JSON configuration: {}", e)))?;

    let Value::Object(overlay) = overlay else {
        return Err(ConfigError::ParseError(
            "configuration must be a JSON object".to_string(),
        )
        .into());
    };

    let mut merged = match serde_json::to_value(defaults).map_err(ConfigError::JsonError)? {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    for (key, value) in overlay {
        if value.is_null() {
            continue;
        }
        if !merged.contains_key(&key) {
            debug!(key = %key, "ignoring unrecognized configuration key");
        }
        merged.insert(key, value);
    }

    let config: Configuration = serde_json::from_value(Value::Object(merged))
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;
    Ok(config)
}

/// Parse an inline JSON configuration over the built-in defaults
pub fn parse_config_json(json: &str) -> Result<Configuration> {
    info!(len = json.len(), "parsing inline configuration");
    let config = merge_configuration(&Configuration::default(), json)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Configuration> {
    info!(path = %path.display(), "loading config");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config = merge_configuration(&Configuration::default(), &content)?;
    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks:
///   1. `<dir>/<name>`          (e.g. `beacon.json`)
///   2. `<dir>/.github/<name>`  (e.g. `.github/beacon.json`)
///
/// The first match wins. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Resolve the run configuration.
///
/// Inline JSON wins over an explicit file path, which wins over a file found
/// by searching `dir`. Without any of them the defaults are used.
pub fn resolve_config(
    inline_json: Option<&str>,
    path: Option<&Path>,
    dir: &Path,
) -> Result<Configuration> {
    if let Some(json) = inline_json.filter(|j| !j.trim().is_empty()) {
        return parse_config_json(json);
    }

    if let Some(path) = path {
        return load_config(path);
    }

    match find_config(dir) {
        Some(found) => load_config(&found),
        None => {
            info!(dir = %dir.display(), "no config found, using defaults");
            Ok(Configuration::default())
        }
    }
}
