//! Prism - a local-first task list for the terminal
//!
//! Prism keeps a single ordered list of tasks. New tasks go to the top,
//! tasks can be toggled, edited, prioritized, removed and reordered, and a
//! long description can be split into sub-tasks by an external service.

pub mod domain;
pub mod storage;
pub mod store;
pub mod decompose;
pub mod cli;

pub use domain::{Filter, Priority, Task, TaskId, TaskList};
pub use store::TaskListStore;
