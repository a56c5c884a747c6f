//! Submit controller for split-on-add
//!
//! A submission goes begin → decompose → complete. While one is pending the
//! composer is busy and refuses another. `complete` and `abandon` always
//! clear the busy flag.

use thiserror::Error;
use tracing::{info, warn};

use super::{normalize_subtasks, DecomposeError, Decomposer};
use crate::domain::{normalize_text, Priority, Task};
use crate::store::TaskListStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    Busy,

    #[error("Task text is empty")]
    Empty,
}

/// A submission waiting on the decomposition service
#[derive(Debug)]
#[must_use = "a pending submission must be completed or abandoned"]
pub struct PendingSubmission {
    text: String,
    priority: Priority,
}

impl PendingSubmission {
    /// Trimmed text sent to the service
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// What a completed submission did to the list
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Sub-tasks were inserted; the last one is now first in the list
    Split(Vec<Task>),

    /// The service had nothing usable, so the original text was added as one task
    Single(Task),

    /// The service failed. Nothing was inserted; `text` is handed back for retry.
    Failed { text: String, notice: String },
}

/// Owns the busy flag gating resubmission
#[derive(Debug)]
pub struct Composer {
    busy: bool,
    max_subtasks: usize,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(8)
    }
}

impl Composer {
    pub fn new(max_subtasks: usize) -> Self {
        Self {
            busy: false,
            max_subtasks,
        }
    }

    /// True while a submission is pending; the submit control should be disabled
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Starts a submission
    pub fn begin(
        &mut self,
        text: &str,
        priority: Priority,
    ) -> Result<PendingSubmission, SubmitError> {
        if self.busy {
            return Err(SubmitError::Busy);
        }
        let text = normalize_text(text).ok_or(SubmitError::Empty)?;

        self.busy = true;
        Ok(PendingSubmission {
            text: text.to_string(),
            priority,
        })
    }

    /// Applies the service result to the store. Exactly one outcome is
    /// dispatched and the busy flag is cleared on every path.
    pub fn complete(
        &mut self,
        pending: PendingSubmission,
        result: Result<Vec<String>, DecomposeError>,
        store: &mut TaskListStore,
    ) -> SubmitOutcome {
        self.busy = false;
        let PendingSubmission { text, priority } = pending;

        let subtasks = match result {
            Ok(raw) => normalize_subtasks(raw, self.max_subtasks),
            Err(e) if e.is_unusable_response() => {
                warn!(error = %e, "Unusable decomposition response, adding as a single task");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Decomposition failed");
                return SubmitOutcome::Failed {
                    text,
                    notice: format!("Could not split task: {}", e),
                };
            }
        };

        if !subtasks.is_empty() {
            let added = store.add_many(&subtasks);
            info!(count = added.len(), "Split task into sub-tasks");
            return SubmitOutcome::Split(added);
        }

        match store.add(&text, priority) {
            Some(task) => SubmitOutcome::Single(task),
            None => SubmitOutcome::Failed {
                notice: "Could not add task".to_string(),
                text,
            },
        }
    }

    /// Drops a pending submission without touching the list
    pub fn abandon(&mut self, pending: PendingSubmission) {
        drop(pending);
        self.busy = false;
    }

    /// Runs a whole submission against `decomposer`
    pub fn submit(
        &mut self,
        text: &str,
        priority: Priority,
        decomposer: &dyn Decomposer,
        store: &mut TaskListStore,
    ) -> Result<SubmitOutcome, SubmitError> {
        let pending = self.begin(text, priority)?;
        let result = decomposer.decompose(pending.text());
        Ok(self.complete(pending, result, store))
    }
}
