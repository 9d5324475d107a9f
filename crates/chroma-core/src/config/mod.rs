//! Configuration management for Chroma.
//!
//! Configuration is loaded from a TOML file with defaults for every field.
//! The defaults describe the standard layout: 8 fetchers, 4 analyzers,
//! queues of 64/16/64, reading `input.txt` and writing `output.csv`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Chroma.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations
    pub io: IoConfig,

    /// Pool sizes and queue capacities
    pub pipeline: PipelineConfig,

    /// Fetch stage settings
    pub fetch: FetchConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories (e.g. `~/.config/chroma/config.toml`
    /// on Linux), falling back to `~/.chroma/config.toml`.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "chroma", "chroma")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".chroma").join("config.toml")
            })
    }

    /// Resolved input path (with ~ expansion).
    pub fn input_path(&self) -> PathBuf {
        expand(&self.io.input)
    }

    /// Resolved output path (with ~ expansion).
    pub fn output_path(&self) -> PathBuf {
        expand(&self.io.output)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
