//! View filters over the task list

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Unknown filter '{0}': expected all, active or completed")]
    Unknown(String),
}

/// Which tasks a view shows. Never mutates the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// Returns true if the task belongs in this view
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    /// Message shown when the view is empty
    pub fn empty_message(&self) -> &'static str {
        match self {
            Filter::Completed => "No completed tasks yet.",
            _ => "No tasks here. Add one above!",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            _ => Err(FilterError::Unknown(s.to_string())),
        }
    }
}

/// Returns the subsequence of `tasks` that `filter` selects, in stored order
pub fn filtered<'a>(tasks: &'a [Task], filter: Filter) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Number of incomplete tasks
pub fn active_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| !t.completed).count()
}

/// Number of completed tasks
pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.completed).count()
}
