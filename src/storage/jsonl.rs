//! JSONL storage for tasks
//!
//! Tasks are stored in `tasks.jsonl` with one JSON object per line, in list
//! order. Uses file locking for concurrent access safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use super::backend::{Persistence, StorageError};
use crate::domain::Task;

/// File name of the task list inside the data directory
pub const TASKS_FILE: &str = "tasks.jsonl";

/// Store for task data in JSONL format
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Creates a new task store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(TASKS_FILE))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all tasks in stored order, failing on the first bad line
    pub fn read_all(&self) -> Result<Vec<Task>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|e| StorageError::io(&self.path, e))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .map_err(|e| StorageError::io(&self.path, e))?;

        let reader = BufReader::new(&file);
        let mut tasks = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| StorageError::io(&self.path, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(&line).map_err(|source| StorageError::Parse {
                line: line_num + 1,
                source,
            })?;

            tasks.push(task);
        }

        // Lock is released when file is dropped
        Ok(tasks)
    }

    /// Writes all tasks to the store (full rewrite)
    pub fn write_all(&self, tasks: &[Task]) -> Result<(), StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| StorageError::io(&temp_path, e))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .map_err(|e| StorageError::io(&temp_path, e))?;

            let mut writer = BufWriter::new(&file);

            for task in tasks {
                let line = serde_json::to_string(task)?;
                writeln!(writer, "{}", line).map_err(|e| StorageError::io(&temp_path, e))?;
            }

            writer.flush().map_err(|e| StorageError::io(&temp_path, e))?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).map_err(|e| StorageError::io(&self.path, e))?;

        debug!(path = %self.path.display(), count = tasks.len(), "Saved task list");
        Ok(())
    }
}

impl Persistence for JsonlStore {
    fn load(&self) -> Vec<Task> {
        match self.read_all() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable task list");
                Vec::new()
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        self.write_all(tasks)
    }
}
