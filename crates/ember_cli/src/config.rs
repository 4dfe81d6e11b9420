//! `ember.json` parsing.
//!
//! ```json
//! { "packages": ["net.json"], "emitBoundTree": false, "lower": true, "maxErrors": 20 }
//! ```
//!
//! Package paths are relative to the directory holding the config file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "ember.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmberConfig {
    /// Package manifests to register before binding.
    pub packages: Vec<PathBuf>,
    /// Print the bound tree after binding.
    pub emit_bound_tree: bool,
    /// Run control-flow lowering over every body.
    pub lower: bool,
    /// Stop printing diagnostics after this many.
    pub max_errors: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a config from a string.
pub fn parse_config(content: &str) -> Result<EmberConfig, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse a config file, resolving package paths against its directory.
pub fn parse_config_file(path: &Path) -> Result<EmberConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut config = parse_config(&content).map_err(|source| ConfigError::Json {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        for package in &mut config.packages {
            if package.is_relative() {
                *package = dir.join(&*package);
            }
        }
    }
    Ok(config)
}

/// Load the config named on the command line, or `ember.json` from the
/// working directory if it exists. A missing default file yields defaults;
/// an explicitly named file must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<EmberConfig, ConfigError> {
    match explicit {
        Some(path) => parse_config_file(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                parse_config_file(path)
            } else {
                tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                Ok(EmberConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"{ "packages": ["net.json"], "emitBoundTree": true, "lower": true, "maxErrors": 5 }"#,
        )
        .unwrap();
        assert_eq!(config.packages, vec![PathBuf::from("net.json")]);
        assert!(config.emit_bound_tree);
        assert!(config.lower);
        assert_eq!(config.max_errors, Some(5));
    }

    #[test]
    fn test_missing_fields_default() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config, EmberConfig::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(parse_config(r#"{ "lower": "yes" }"#).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("definitely/not/here/ember.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "Expected an I/O error, got {}", err);
    }
}
