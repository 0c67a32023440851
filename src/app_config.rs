//! Module for application configuration settings.
//!
//! User configurations may be specified in a configuration file. Every key is
//! optional; a missing file means the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use unix_v4::fs::seed::SeedConfig;
use unix_v4::shell::ShellConfig;

fn default_banner() -> bool {
    true
}

/// Application configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Shell session settings.
    #[serde(default)]
    pub shell: ShellConfig,

    /// How the filesystem is seeded at boot.
    #[serde(default)]
    pub seed: SeedConfig,

    /// Whether to print the ASCII banner before an interactive session.
    #[serde(default = "default_banner")]
    pub banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: ShellConfig::default(),
            seed: SeedConfig::default(),
            banner: default_banner(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation errors: {0:?}")]
    ValidationErrors(Vec<String>),

    #[error("Deserialization error: {0}")]
    DeserializationError(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Config {
    /// Validate the correctness of the configuration.
    ///
    /// Returns:
    /// - `Ok(())` if the configuration is valid.
    /// - `Err(Vec<String>)` containing a list of validation error messages otherwise.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        self.shell.validate()
    }

    /// Returns config file paths in descending priority order.
    fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(xdg) = dirs::config_dir() {
            paths.push(xdg.join("unix-v4").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            let fallback = home.join(".config").join("unix-v4").join("config.toml");
            if !paths.contains(&fallback) {
                paths.push(fallback);
            }
        }

        paths.push(PathBuf::from("/etc/unix-v4/config.toml"));

        paths
    }

    /// Finds the first existing config file from search paths.
    fn find_config_file() -> Option<PathBuf> {
        Self::config_search_paths().into_iter().find(|p| p.exists())
    }

    /// Parses a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads config from a single TOML file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = ?path, "Loading configuration file.");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Loads configuration from the external path if given, else the first
    /// config file found, else the defaults. The result is validated.
    pub fn load(external_config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match external_config_path
            .map(Path::to_path_buf)
            .or_else(Self::find_config_file)
        {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                debug!("No configuration file found, using defaults.");
                Self::default()
            }
        };

        config.validate().map_err(ConfigError::ValidationErrors)?;
        Ok(config)
    }
}
