//! Task domain model
//!
//! A task is a short line of text with a completion flag and an optional
//! priority. Text is always stored trimmed and never empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::id::TaskId;

#[derive(Debug, Error, PartialEq)]
pub enum PriorityError {
    #[error("Unknown priority '{0}': expected none, low, medium or high")]
    Unknown(String),
}

/// Urgency tag on a task, independent of completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::None => "none",
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Marker for compact listings
    pub fn marker(&self) -> &'static str {
        match self {
            Priority::None => " ",
            Priority::Low => "!",
            Priority::Medium => "!!",
            Priority::High => "!!!",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Priority::None),
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(PriorityError::Unknown(s.to_string())),
        }
    }
}

/// Trims task text, returning None when nothing is left
pub fn normalize_text(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, immutable for the task's lifetime
    pub id: TaskId,

    /// Trimmed, non-empty text
    pub text: String,

    /// Completion flag
    #[serde(default)]
    pub completed: bool,

    /// Urgency tag
    #[serde(default)]
    pub priority: Priority,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new, incomplete task. Callers pass already-normalized text.
    pub fn new(
        id: TaskId,
        text: impl Into<String>,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            priority,
            created_at,
        }
    }

    /// Flips the completion flag. Nothing else changes.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Replaces the text. Returns false (and leaves the task untouched) when
    /// the new text is blank or equal to the current text.
    pub fn set_text(&mut self, text: &str) -> bool {
        match normalize_text(text) {
            Some(text) if text != self.text => {
                self.text = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Sets the priority. Returns false if it was already set to that value.
    pub fn set_priority(&mut self, priority: Priority) -> bool {
        if self.priority == priority {
            return false;
        }
        self.priority = priority;
        true
    }

    /// Returns true if the task has valid stored text
    pub fn has_valid_text(&self) -> bool {
        normalize_text(&self.text) == Some(self.text.as_str())
    }
}
