//! Domain models for Prism
//!
//! Contains the task list logic without any I/O concerns.

mod drag;
mod filter;
mod id;
mod list;
mod task;

pub use drag::{DragSession, Reorder};
pub use filter::{active_count, completed_count, filtered, Filter, FilterError};
pub use id::{IdError, TaskId};
pub use list::TaskList;
pub use task::{normalize_text, Priority, PriorityError, Task};
