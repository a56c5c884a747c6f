//! Output formatting for CLI commands

use serde::Serialize;

use crate::domain::Task;
pub use crate::storage::OutputFormat;

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                // Callers render text themselves; this is a fallback
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints one task as a list row (text only)
    pub fn task_row(&self, task: &Task) {
        if self.format == OutputFormat::Text {
            println!("{}", task_line(task));
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

/// `t-1a2b3c4d  [x] !!  text`
pub fn task_line(task: &Task) -> String {
    let check = if task.completed { "x" } else { " " };
    format!(
        "{}  [{}] {:<3} {}",
        task.id,
        check,
        task.priority.marker(),
        task.text
    )
}

/// Footer under a listing, e.g. "1 item left"
pub fn items_left(active: usize) -> String {
    let noun = if active == 1 { "item" } else { "items" };
    format!("{} {} left", active, noun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, TaskId};
    use chrono::Utc;

    #[test]
    fn footer_pluralizes() {
        assert_eq!(items_left(0), "0 items left");
        assert_eq!(items_left(1), "1 item left");
        assert_eq!(items_left(2), "2 items left");
    }

    #[test]
    fn task_line_shows_state() {
        let now = Utc::now();
        let mut task = Task::new(TaskId::new("ship it", now), "ship it", Priority::High, now);
        assert!(task_line(&task).ends_with("[ ] !!! ship it"));

        task.toggle();
        assert!(task_line(&task).contains("[x]"));
    }
}
