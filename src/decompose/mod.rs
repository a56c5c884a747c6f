//! # Task Decomposition
//!
//! Splits one task description into several sub-tasks using an external
//! service. The store only ever sees the resulting strings.
//!
//! ## Backends
//!
//! | Provider | Type | Transport |
//! |----------|------|-----------|
//! | `plugin` | [`PluginDecomposer`] | `prism-decompose-*` executable, JSON over stdin/stdout |
//! | `http` | [`HttpDecomposer`] | OpenAI-compatible chat completions |
//!
//! ## Protocol
//!
//! ```text
//! CLI                          Plugin Binary
//!  │                               │
//!  ├── Spawn: prism-decompose-x    │
//!  │                               │
//!  ├── Stdin: {"operation": "decompose", "params": {"text": "plan trip"}}
//!  │                               │
//!  └── Stdout: {"success": true, "data": {"subtasks": ["book flights", ...]}}
//! ```
//!
//! ## Submitting
//!
//! [`Composer`] owns the busy flag that gates resubmission while a request
//! is pending, and turns each result into exactly one [`SubmitOutcome`].

mod composer;
mod http;
mod plugin;
mod protocol;

use std::path::Path;

use thiserror::Error;

use crate::storage::{DecomposeConfig, DecomposeProvider};

pub use composer::{Composer, PendingSubmission, SubmitError, SubmitOutcome};
pub use http::{parse_subtask_array, HttpDecomposer};
pub use plugin::{PluginDecomposer, PluginInfo, PluginLoader, PLUGIN_PREFIX};
pub use protocol::{PluginManifest, PluginRequest, PluginResponse};

#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error("Task splitting is not configured. Set [decompose] provider in the config file.")]
    NotConfigured,

    #[error("No API key: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("Unauthorized: the decomposition service rejected the API key")]
    Unauthorized,

    #[error("Rate limited by the decomposition service")]
    RateLimited,

    #[error("Decomposition service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Plugin {0} does not support the decompose operation")]
    Unsupported(String),

    #[error("Failed to run plugin: {0}")]
    Spawn(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl DecomposeError {
    /// True when the service answered but nothing usable came back. These
    /// fall back to adding the original text as one task.
    pub fn is_unusable_response(&self) -> bool {
        matches!(self, DecomposeError::Malformed(_))
    }
}

/// Splits a task description into sub-task strings
pub trait Decomposer {
    fn decompose(&self, text: &str) -> Result<Vec<String>, DecomposeError>;
}

impl<D: Decomposer + ?Sized> Decomposer for Box<D> {
    fn decompose(&self, text: &str) -> Result<Vec<String>, DecomposeError> {
        (**self).decompose(text)
    }
}

/// Trims each sub-task, drops blanks and keeps at most `max`
pub fn normalize_subtasks(raw: Vec<String>, max: usize) -> Vec<String> {
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(max)
        .collect()
}

/// Builds the decomposer selected by config. Plugins are looked up in
/// `{data_dir}/plugins/` first, then on PATH, and must list `decompose`
/// in their `--manifest`.
pub fn from_config(
    config: &DecomposeConfig,
    data_dir: &Path,
) -> Result<Box<dyn Decomposer>, DecomposeError> {
    match config.provider {
        DecomposeProvider::None => Err(DecomposeError::NotConfigured),
        DecomposeProvider::Plugin => {
            let mut loader = PluginLoader::new();
            loader.add_plugin_dir(data_dir.join("plugins"));
            loader.discover();

            if loader.get(&config.plugin).is_none() {
                return Err(DecomposeError::PluginNotFound(config.plugin.clone()));
            }
            if !loader.manifest(&config.plugin)?.supports_decompose() {
                return Err(DecomposeError::Unsupported(config.plugin.clone()));
            }
            Ok(Box::new(PluginDecomposer::new(loader, config.plugin.clone())))
        }
        DecomposeProvider::Http => Ok(Box::new(HttpDecomposer::from_config(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalize_trims_drops_and_caps() {
        let raw = vec![
            " a ".to_string(),
            "   ".to_string(),
            "b".to_string(),
            "c".to_string(),
        ];
        assert_eq!(normalize_subtasks(raw, 2), ["a", "b"]);
    }

    #[test]
    fn provider_none_is_not_configured() {
        let dir = TempDir::new().unwrap();
        let result = from_config(&DecomposeConfig::default(), dir.path());
        assert!(matches!(result, Err(DecomposeError::NotConfigured)));
    }

    #[test]
    fn missing_plugin_fails_early() {
        let dir = TempDir::new().unwrap();
        let config = DecomposeConfig {
            provider: DecomposeProvider::Plugin,
            plugin: "prism-decompose-definitely-missing".to_string(),
            ..DecomposeConfig::default()
        };

        assert!(matches!(
            from_config(&config, dir.path()),
            Err(DecomposeError::PluginNotFound(_))
        ));
    }

    #[test]
    fn only_malformed_is_unusable() {
        assert!(DecomposeError::Malformed("x".into()).is_unusable_response());
        assert!(!DecomposeError::RateLimited.is_unusable_response());
        assert!(!DecomposeError::Plugin("boom".into()).is_unusable_response());
    }

    #[cfg(unix)]
    fn plugin_config(dir: &TempDir, operations: &str) -> DecomposeConfig {
        use std::os::unix::fs::PermissionsExt;

        let plugins = dir.path().join("plugins");
        std::fs::create_dir_all(&plugins).unwrap();
        let path = plugins.join("prism-decompose-local");
        let script = r#"#!/bin/sh
if [ "$1" = "--manifest" ]; then
  echo '{"name":"prism-decompose-local","version":"0.1.0","description":"local","operations":OPS}'
  exit 0
fi
read line
echo '{"success":true}'
"#
        .replace("OPS", operations);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        DecomposeConfig {
            provider: DecomposeProvider::Plugin,
            plugin: "prism-decompose-local".to_string(),
            ..DecomposeConfig::default()
        }
    }

    #[cfg(unix)]
    #[test]
    fn plugin_listing_decompose_is_accepted() {
        let dir = TempDir::new().unwrap();
        let config = plugin_config(&dir, r#"["decompose"]"#);

        let decomposer = from_config(&config, dir.path()).unwrap();
        assert!(decomposer.decompose("x").unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn plugin_without_decompose_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = plugin_config(&dir, r#"["sync"]"#);

        assert!(matches!(
            from_config(&config, dir.path()),
            Err(DecomposeError::Unsupported(name)) if name == "prism-decompose-local"
        ));
    }
}
