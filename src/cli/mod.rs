//! # Command-Line Interface
//!
//! User-facing commands and output formatting. Each command opens the task
//! list, calls one store operation and renders the result.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `add` | Add a task, optionally split into sub-tasks with `--split` |
//! | `list` | Show tasks, filtered by `--filter all\|active\|completed` |
//! | `toggle`, `edit`, `priority`, `rm` | Change one task |
//! | `clear-completed` | Drop every completed task |
//! | `move` | Move a task into another task's position |
//! | `status` | Active and completed counts |
//!
//! Task IDs can be shortened to any unique prefix.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! prism --verbose list
//! ```
//!
//! Library logs go to stderr and can be tuned with `PRISM_LOG`.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
