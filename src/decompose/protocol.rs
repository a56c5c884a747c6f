//! Decomposition plugin protocol types
//!
//! Plugins communicate via JSON messages over stdin/stdout.
//! Each plugin must support the `--manifest` flag to declare capabilities.

use serde::{Deserialize, Serialize};

use super::DecomposeError;

/// Operation name for splitting a task
pub const DECOMPOSE_OPERATION: &str = "decompose";

/// Plugin manifest declaring capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin name (e.g., "prism-decompose-default")
    pub name: String,

    /// Plugin version
    pub version: String,

    /// Human-readable description
    pub description: String,

    /// Supported operations
    pub operations: Vec<String>,
}

impl PluginManifest {
    /// Returns true if the plugin can split tasks
    pub fn supports_decompose(&self) -> bool {
        self.operations.iter().any(|op| op == DECOMPOSE_OPERATION)
    }
}

/// A message sent to a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRequest {
    /// The operation to perform
    pub operation: String,

    /// Operation-specific parameters
    pub params: serde_json::Value,
}

impl PluginRequest {
    pub fn new(operation: impl Into<String>, params: impl Into<serde_json::Value>) -> Self {
        Self {
            operation: operation.into(),
            params: params.into(),
        }
    }

    /// Request to split `text` into sub-tasks
    pub fn decompose(text: &str) -> Self {
        Self::new(DECOMPOSE_OPERATION, serde_json::json!({ "text": text }))
    }
}

/// A response from a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginResponse {
    /// Whether the operation succeeded
    pub success: bool,

    /// Result data (if success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Error message (if failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload of a successful decompose response
#[derive(Debug, Deserialize)]
struct DecomposeData {
    #[serde(default)]
    subtasks: Vec<String>,
}

impl PluginResponse {
    /// Extracts the sub-task list from a decompose response
    pub fn into_subtasks(self) -> Result<Vec<String>, DecomposeError> {
        if !self.success {
            return Err(DecomposeError::Plugin(
                self.error.unwrap_or_else(|| "plugin reported failure".to_string()),
            ));
        }

        match self.data {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(data) => serde_json::from_value::<DecomposeData>(data)
                .map(|d| d.subtasks)
                .map_err(|e| DecomposeError::Malformed(e.to_string())),
        }
    }
}
