//! Configuration handling for Prism
//!
//! Configuration is stored in `~/.config/prism/config.toml` (or the
//! platform equivalent). Every field has a default, so a missing file is
//! the same as an empty one.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Which decomposition backend `add --split` uses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecomposeProvider {
    /// Splitting is disabled
    #[default]
    None,
    /// External `prism-decompose-*` executable
    Plugin,
    /// OpenAI-compatible chat completions endpoint
    Http,
}

impl DecomposeProvider {
    pub fn as_str(&self) -> &str {
        match self {
            DecomposeProvider::None => "none",
            DecomposeProvider::Plugin => "plugin",
            DecomposeProvider::Http => "http",
        }
    }
}

/// Settings for the text-decomposition service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeConfig {
    /// Backend to use
    pub provider: DecomposeProvider,

    /// Plugin executable name for the `plugin` provider
    pub plugin: String,

    /// Base URL for the `http` provider
    pub endpoint: String,

    /// Model name sent to the `http` provider
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Upper bound on sub-tasks kept from one response
    pub max_subtasks: usize,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            provider: DecomposeProvider::None,
            plugin: "prism-decompose-default".to_string(),
            endpoint: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            api_key_env: "PRISM_API_KEY".to_string(),
            timeout_secs: 30,
            max_subtasks: 8,
        }
    }
}

impl DecomposeConfig {
    /// Reads the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Where the task list lives (defaults to the platform data directory)
    pub data_dir: Option<PathBuf>,

    /// Decomposition settings
    pub decompose: DecomposeConfig,
}

impl Config {
    /// Returns the platform directories for Prism
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "prism", "prism")
    }

    /// Returns the default config file path
    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file; a missing file yields defaults
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.decompose.max_subtasks == 0 {
            return Err(ConfigError::Invalid(
                "decompose.max_subtasks must be at least 1".to_string(),
            ));
        }
        if self.decompose.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "decompose.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves the data directory: explicit override, then config, then the
    /// platform data directory
    pub fn data_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();

        assert_eq!(config.default_format, OutputFormat::Text);
        assert_eq!(config.decompose.provider, DecomposeProvider::None);
        assert_eq!(config.decompose.max_subtasks, 8);
        assert_eq!(config.decompose.api_key_env, "PRISM_API_KEY");
    }

    #[test]
    fn parse_config() {
        let toml = r#"
default_format = "json"
data_dir = "/tmp/prism"

[decompose]
provider = "plugin"
plugin = "prism-decompose-local"
max_subtasks = 3
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/prism")));
        assert_eq!(config.decompose.provider, DecomposeProvider::Plugin);
        assert_eq!(config.decompose.plugin, "prism-decompose-local");
        assert_eq!(config.decompose.max_subtasks, 3);
        // Unset fields keep their defaults
        assert_eq!(config.decompose.timeout_secs, 30);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_path(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.decompose.provider, DecomposeProvider::None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_format = [").unwrap();

        assert!(Config::from_path(&path).is_err());
    }

    #[test]
    fn zero_max_subtasks_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[decompose]\nmax_subtasks = 0\n").unwrap();

        let err = Config::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("max_subtasks"));
    }

    #[test]
    fn data_dir_resolution_order() {
        let mut config = Config::default();
        config.data_dir = Some(PathBuf::from("/from/config"));

        assert_eq!(
            config.data_dir(Some(Path::new("/from/flag"))).unwrap(),
            PathBuf::from("/from/flag")
        );
        assert_eq!(config.data_dir(None).unwrap(), PathBuf::from("/from/config"));
    }
}
