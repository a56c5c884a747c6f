//! Decomposition plugin discovery and execution
//!
//! Plugins are discovered from:
//! 1. `{data_dir}/plugins/` directory
//! 2. PATH (executables starting with "prism-decompose-")

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use super::protocol::{PluginManifest, PluginRequest, PluginResponse};
use super::{DecomposeError, Decomposer};

/// Executable name prefix for decomposition plugins
pub const PLUGIN_PREFIX: &str = "prism-decompose-";

/// Information about a discovered plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Plugin name
    pub name: String,

    /// Path to the plugin executable
    pub path: PathBuf,
}

/// Plugin loader and executor
#[derive(Debug, Default)]
pub struct PluginLoader {
    /// Discovered plugins
    plugins: HashMap<String, PluginInfo>,

    /// Additional plugin directories, searched before PATH
    plugin_dirs: Vec<PathBuf>,

    /// Whether to search PATH
    search_path: bool,
}

impl PluginLoader {
    /// Creates a loader that searches PATH
    pub fn new() -> Self {
        Self {
            search_path: true,
            ..Self::default()
        }
    }

    /// Creates a loader that only searches explicitly added directories
    pub fn without_path() -> Self {
        Self::default()
    }

    /// Adds a plugin directory to search
    pub fn add_plugin_dir(&mut self, dir: impl Into<PathBuf>) {
        self.plugin_dirs.push(dir.into());
    }

    /// Discovers all available plugins
    pub fn discover(&mut self) {
        self.plugins.clear();

        // Data-dir plugins win over PATH
        for dir in &self.plugin_dirs.clone() {
            self.scan_directory(dir);
        }

        if self.search_path {
            if let Ok(path_var) = std::env::var("PATH") {
                for dir in std::env::split_paths(&path_var) {
                    self.scan_directory(&dir);
                }
            }
        }

        debug!(count = self.plugins.len(), "Discovered decomposition plugins");
    }

    /// Scans a directory for plugins
    fn scan_directory(&mut self, dir: &Path) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(_) => return, // Ignore missing or unreadable directories
        };

        for entry in entries.flatten() {
            let path = entry.path();

            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with(PLUGIN_PREFIX) && is_executable(&path) {
                    let plugin_name = name.to_string();

                    // Don't override existing plugins (first found wins)
                    self.plugins
                        .entry(plugin_name.clone())
                        .or_insert(PluginInfo {
                            name: plugin_name,
                            path,
                        });
                }
            }
        }
    }

    /// Gets a plugin by name
    pub fn get(&self, name: &str) -> Option<&PluginInfo> {
        self.plugins.get(name)
    }

    /// Loads the manifest from a plugin
    pub fn manifest(&self, name: &str) -> Result<PluginManifest, DecomposeError> {
        let info = self
            .get(name)
            .ok_or_else(|| DecomposeError::PluginNotFound(name.to_string()))?;

        let output = Command::new(&info.path)
            .arg("--manifest")
            .output()
            .map_err(|e| DecomposeError::Spawn(format!("{}: {}", info.path.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DecomposeError::Plugin(stderr.trim().to_string()));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| DecomposeError::Malformed(format!("manifest: {}", e)))
    }

    /// Executes a plugin request
    pub fn execute(
        &self,
        name: &str,
        request: &PluginRequest,
    ) -> Result<PluginResponse, DecomposeError> {
        let info = self
            .get(name)
            .ok_or_else(|| DecomposeError::PluginNotFound(name.to_string()))?;

        let mut child = Command::new(&info.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DecomposeError::Spawn(format!("{}: {}", info.path.display(), e)))?;

        // Send request, then close stdin so the plugin sees EOF
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| DecomposeError::Spawn("plugin stdin unavailable".to_string()))?;
            let request_json = serde_json::to_string(request)
                .map_err(|e| DecomposeError::Malformed(e.to_string()))?;
            writeln!(stdin, "{}", request_json)
                .map_err(|e| DecomposeError::Spawn(format!("write to plugin: {}", e)))?;
        }

        // Drain stdout and stderr together; a plugin blocked on a full
        // stderr pipe would otherwise never exit
        let output = child
            .wait_with_output()
            .map_err(|e| DecomposeError::Spawn(format!("wait for plugin: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DecomposeError::Plugin(format!(
                "{} exited with {}: {}",
                name,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let response_line = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| DecomposeError::Plugin("no response from plugin".to_string()))?;

        serde_json::from_str(response_line)
            .map_err(|e| DecomposeError::Malformed(format!("plugin response: {}", e)))
    }
}

/// Checks if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = path.metadata() {
            return meta.is_file() && meta.permissions().mode() & 0o111 != 0;
        }
    }

    #[cfg(windows)]
    {
        if let Some(ext) = path.extension() {
            return ext == "exe" || ext == "bat" || ext == "cmd";
        }
    }

    false
}

/// Decomposer backed by an external plugin executable
#[derive(Debug)]
pub struct PluginDecomposer {
    loader: PluginLoader,
    name: String,
}

impl PluginDecomposer {
    pub fn new(loader: PluginLoader, name: impl Into<String>) -> Self {
        Self {
            loader,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Decomposer for PluginDecomposer {
    fn decompose(&self, text: &str) -> Result<Vec<String>, DecomposeError> {
        debug!(plugin = %self.name, "Requesting decomposition from plugin");
        self.loader
            .execute(&self.name, &PluginRequest::decompose(text))?
            .into_subtasks()
    }
}
