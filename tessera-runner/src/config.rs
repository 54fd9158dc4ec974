//! Runner configuration.
//!
//! Loaded from the `[runner]` table of a suite file or from a standalone
//! TOML document with the same fields.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default bound on restart requests for a single variant.
pub const DEFAULT_MAX_RESTARTS: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Execution settings for the runner shim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Restart requests honoured per variant before it is failed.
    pub max_restarts: u32,

    /// Keep running the remaining variants after a failure.
    pub keep_going: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_restarts: DEFAULT_MAX_RESTARTS,
            keep_going: true,
        }
    }
}

impl RunnerConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = RunnerConfig::from_toml("").unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.max_restarts, DEFAULT_MAX_RESTARTS);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = RunnerConfig::from_toml("max_restarts = 3").unwrap();
        assert_eq!(config.max_restarts, 3);
        assert!(config.keep_going);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = RunnerConfig::from_toml("max_retries = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RunnerConfig::from_file(Path::new("/nonexistent/runner.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/runner.toml"));
    }
}
