//! In-memory persistence, for tests and ephemeral sessions
//!
//! Clones share the same underlying list, so a test can hand one clone to
//! the store and inspect what was saved through another.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::backend::{Persistence, StorageError};
use crate::domain::Task;

#[derive(Default)]
struct Inner {
    tasks: RefCell<Vec<Task>>,
    saves: Cell<usize>,
    simulate_write_error: Cell<bool>,
}

/// Single-threaded in-memory adapter
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `tasks`
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::new();
        *store.inner.tasks.borrow_mut() = tasks;
        store
    }

    /// Returns a copy of what was last saved
    pub fn saved(&self) -> Vec<Task> {
        self.inner.tasks.borrow().clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.inner.saves.get()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.inner.simulate_write_error.set(simulate);
    }
}

impl Persistence for MemoryStore {
    fn load(&self) -> Vec<Task> {
        self.saved()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        if self.inner.simulate_write_error.get() {
            return Err(StorageError::Simulated);
        }
        *self.inner.tasks.borrow_mut() = tasks.to_vec();
        self.inner.saves.set(self.inner.saves.get() + 1);
        Ok(())
    }
}
