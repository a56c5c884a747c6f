//! Task list store
//!
//! The single owner of the task list. Every effective mutation bumps the
//! version, saves through the [`Persistence`] adapter and notifies
//! subscribers with the new snapshot. No-ops (blank text, unknown IDs,
//! unchanged values) do none of those.

use chrono::Utc;
use tracing::{debug, error, warn};

use crate::domain::{
    active_count, completed_count, filtered, DragSession, Filter, Priority, Task, TaskId, TaskList,
};
use crate::storage::Persistence;

type Observer = Box<dyn FnMut(&[Task], u64)>;

/// Owns the authoritative task list
pub struct TaskListStore {
    list: TaskList,
    persistence: Box<dyn Persistence>,
    version: u64,
    observers: Vec<Observer>,
}

impl TaskListStore {
    /// Loads the list from `persistence`. Stored data that violates the list
    /// invariants (duplicate IDs, blank text) is discarded.
    pub fn open(persistence: impl Persistence + 'static) -> Self {
        let stored = persistence.load();
        let count = stored.len();

        let list = TaskList::from_tasks(stored).unwrap_or_else(|| {
            warn!(count, "Stored task list is inconsistent, starting empty");
            TaskList::new()
        });
        debug!(count = list.len(), "Opened task list");

        Self {
            list,
            persistence: Box::new(persistence),
            version: 0,
            observers: Vec::new(),
        }
    }

    /// Current snapshot in stored order
    pub fn tasks(&self) -> &[Task] {
        self.list.as_slice()
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    /// Incremented once per effective mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.list.get(id)
    }

    /// Registers a rendering subscriber, called with the snapshot and version
    /// after every effective mutation
    pub fn subscribe(&mut self, observer: impl FnMut(&[Task], u64) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Adds a task at the head. Blank text is rejected.
    pub fn add(&mut self, text: &str, priority: Priority) -> Option<Task> {
        let task = self.list.push_front(text, priority, Utc::now())?.clone();
        debug!(id = %task.id, "Added task");
        self.commit();
        Some(task)
    }

    /// Adds each non-blank text in order. Every insert goes to the head, so
    /// the last text ends up first.
    pub fn add_many<I, S>(&mut self, texts: I) -> Vec<Task>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .filter_map(|text| self.add(text.as_ref(), Priority::None))
            .collect()
    }

    pub fn toggle_completion(&mut self, id: &TaskId) -> bool {
        self.apply(|list| list.toggle(id), "Toggled task", id)
    }

    pub fn set_priority(&mut self, id: &TaskId, priority: Priority) -> bool {
        self.apply(|list| list.set_priority(id, priority), "Set priority", id)
    }

    /// Replaces the text. Blank or unchanged text keeps the prior text.
    pub fn edit(&mut self, id: &TaskId, text: &str) -> bool {
        self.apply(|list| list.edit(id, text), "Edited task", id)
    }

    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let removed = self.list.remove(id)?;
        debug!(id = %id, "Removed task");
        self.commit();
        Some(removed)
    }

    /// Removes every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let removed = self.list.clear_completed();
        if removed > 0 {
            debug!(removed, "Cleared completed tasks");
            self.commit();
        }
        removed
    }

    /// Moves `dragged` into the index currently held by `target`
    pub fn reorder(&mut self, dragged: &TaskId, target: &TaskId) -> bool {
        let moved = self.list.reorder(dragged, target);
        if moved {
            debug!(dragged = %dragged, target = %target, "Reordered task");
            self.commit();
        }
        moved
    }

    /// Finishes a drag gesture, applying the reorder it produced (if any)
    pub fn drop_drag(&mut self, session: &mut DragSession) -> bool {
        match session.drop() {
            Some(reorder) => self.reorder(&reorder.dragged, &reorder.target),
            None => false,
        }
    }

    /// Tasks selected by `filter`, in stored order
    pub fn filtered_view(&self, filter: Filter) -> Vec<&Task> {
        filtered(self.tasks(), filter)
    }

    pub fn active_count(&self) -> usize {
        active_count(self.tasks())
    }

    pub fn completed_count(&self) -> usize {
        completed_count(self.tasks())
    }

    fn apply(
        &mut self,
        mutate: impl FnOnce(&mut TaskList) -> bool,
        what: &str,
        id: &TaskId,
    ) -> bool {
        let changed = mutate(&mut self.list);
        if changed {
            debug!(id = %id, "{}", what);
            self.commit();
        }
        changed
    }

    /// Records an effective mutation: bump version, save, notify
    fn commit(&mut self) {
        self.version += 1;

        if let Err(e) = self.persistence.save(self.list.as_slice()) {
            error!(error = %e, version = self.version, "Failed to save task list");
        }

        let snapshot = self.list.as_slice();
        for observer in &mut self.observers {
            observer(snapshot, self.version);
        }
    }
}
