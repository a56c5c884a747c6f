//! Persistence interface for the task list

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Task;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse task at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize task: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Simulated write error")]
    Simulated,
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Stores and retrieves the serialized task list.
///
/// `load` never fails: unreadable or corrupt data is logged and treated as
/// an empty list so startup always succeeds. `save` is idempotent and is
/// called after every effective mutation.
pub trait Persistence {
    /// Loads the stored list, or an empty one if nothing usable is stored
    fn load(&self) -> Vec<Task>;

    /// Replaces the stored list
    fn save(&self, tasks: &[Task]) -> Result<(), StorageError>;
}

impl<P: Persistence + ?Sized> Persistence for Box<P> {
    fn load(&self) -> Vec<Task> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        (**self).save(tasks)
    }
}
