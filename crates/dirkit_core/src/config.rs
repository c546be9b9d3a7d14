//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe logging and search defaults for one process.
//! - Load and validate configuration from JSON.
//!
//! # Invariants
//! - A loaded configuration has passed `validate()`.
//! - Unknown keys are rejected rather than ignored.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LoggingError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Process-level settings for the command core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<String>,
    /// Default cap for `Search` results.
    pub search_size_limit: Option<usize>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            search_size_limit: None,
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level).map_err(ConfigError::InvalidLogLevel)?;
        if let Some(log_dir) = self.log_dir.as_deref() {
            normalize_log_dir(log_dir).map_err(ConfigError::InvalidLogDir)?;
        }
        if self.search_size_limit == Some(0) {
            return Err(ConfigError::InvalidSizeLimit);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidLogLevel(LoggingError),
    InvalidLogDir(LoggingError),
    InvalidSizeLimit,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidLogLevel(err) | Self::InvalidLogDir(err) => write!(f, "invalid config: {err}"),
            Self::InvalidSizeLimit => write!(f, "search_size_limit must be greater than zero"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidLogLevel(err) | Self::InvalidLogDir(err) => Some(err),
            Self::InvalidSizeLimit => None,
        }
    }
}
