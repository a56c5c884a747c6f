//! # Storage Layer
//!
//! Persistence adapters and configuration for Prism.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line, list order) | `{data_dir}/tasks.jsonl` |
//! | Config | TOML | `~/.config/prism/config.toml` |
//! | Plugins | Executables | `{data_dir}/plugins/` |
//!
//! ## Failure Policy
//!
//! - Loading never fails: corrupt or unreadable data is logged and the list
//!   starts empty
//! - Writes are atomic (temp file + rename) and take an exclusive `fs2` lock
//! - A malformed config file *is* an error, since the user wrote it
//!
//! ## Key Types
//!
//! - [`Persistence`] - Load/save contract the task list store depends on
//! - [`JsonlStore`] - File-backed adapter
//! - [`MemoryStore`] - In-process adapter for tests
//! - [`Config`] - User configuration

mod backend;
mod config;
mod jsonl;
mod memory;

pub use backend::{Persistence, StorageError};
pub use config::{Config, ConfigError, DecomposeConfig, DecomposeProvider, OutputFormat};
pub use jsonl::{JsonlStore, TASKS_FILE};
pub use memory::MemoryStore;
