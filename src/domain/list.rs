//! Ordered task list
//!
//! The stored order is the authoritative manual order. New tasks go to the
//! head. Every mutator reports whether it changed anything so callers can
//! skip saves and notifications for no-ops.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::TaskId;
use super::task::{normalize_text, Priority, Task};

/// An ordered sequence of tasks with unique IDs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList(Vec<Task>);

impl TaskList {
    /// Creates an empty list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a list from stored tasks, rejecting duplicate IDs and blank text
    pub fn from_tasks(tasks: Vec<Task>) -> Option<Self> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if !seen.insert(&task.id) || !task.has_valid_text() {
                return None;
            }
        }
        Some(Self(tasks))
    }

    /// Returns the tasks in stored order
    pub fn as_slice(&self) -> &[Task] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.0.iter()
    }

    /// Position of the task with this ID
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.0.iter().position(|t| &t.id == id)
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.0.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.position(id).is_some()
    }

    /// Tasks whose ID starts with `prefix`, in stored order
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&Task> {
        self.0.iter().filter(|t| t.id.matches_prefix(prefix)).collect()
    }

    fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.0.iter_mut().find(|t| &t.id == id)
    }

    /// Generates an ID that no task in the list uses yet
    fn fresh_id(&self, text: &str, now: DateTime<Utc>) -> TaskId {
        let mut salt = 0;
        loop {
            let id = TaskId::salted(text, now, salt);
            if !self.contains(&id) {
                return id;
            }
            salt += 1;
        }
    }

    /// Inserts a new task at the head. Returns None for blank text.
    pub fn push_front(
        &mut self,
        text: &str,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Option<&Task> {
        let text = normalize_text(text)?;
        let id = self.fresh_id(text, now);
        self.0.insert(0, Task::new(id, text, priority, now));
        self.0.first()
    }

    /// Flips completion on the task with this ID
    pub fn toggle(&mut self, id: &TaskId) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.toggle();
                true
            }
            None => false,
        }
    }

    /// Sets priority on the task with this ID
    pub fn set_priority(&mut self, id: &TaskId, priority: Priority) -> bool {
        self.get_mut(id)
            .map(|task| task.set_priority(priority))
            .unwrap_or(false)
    }

    /// Replaces text on the task with this ID; blank or unchanged text is discarded
    pub fn edit(&mut self, id: &TaskId, text: &str) -> bool {
        self.get_mut(id)
            .map(|task| task.set_text(text))
            .unwrap_or(false)
    }

    /// Removes the task with this ID
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.0.remove(index))
    }

    /// Removes every completed task, keeping the relative order of the rest.
    /// Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.0.len();
        self.0.retain(|t| !t.completed);
        before - self.0.len()
    }

    /// Moves `dragged` into the index currently held by `target`.
    ///
    /// The dragged task is taken out first and then inserted at the target's
    /// original index, so a forward move lands after the target and a
    /// backward move lands before it.
    pub fn reorder(&mut self, dragged: &TaskId, target: &TaskId) -> bool {
        if dragged == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(dragged), self.position(target)) else {
            return false;
        };

        let task = self.0.remove(from);
        self.0.insert(to, task);
        true
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<TaskList> for Vec<Task> {
    fn from(list: TaskList) -> Self {
        list.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(texts: &[&str]) -> TaskList {
        // Pushing in reverse leaves `texts` in the given order
        let mut list = TaskList::new();
        let now = Utc::now();
        for text in texts.iter().rev() {
            list.push_front(text, Priority::None, now);
        }
        list
    }

    fn texts(list: &TaskList) -> Vec<&str> {
        list.iter().map(|t| t.text.as_str()).collect()
    }

    fn id_of(list: &TaskList, text: &str) -> TaskId {
        list.iter().find(|t| t.text == text).unwrap().id.clone()
    }

    #[test]
    fn push_front_inserts_at_head() {
        let mut list = list_of(&["b"]);
        let task = list.push_front("  a ", Priority::High, Utc::now()).unwrap();
        assert_eq!(task.text, "a");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(texts(&list), ["a", "b"]);
    }

    #[test]
    fn push_front_rejects_blank() {
        let mut list = list_of(&["a"]);
        assert!(list.push_front("   ", Priority::None, Utc::now()).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn same_text_same_instant_gets_distinct_ids() {
        let mut list = TaskList::new();
        let now = Utc::now();
        let a = list.push_front("dup", Priority::None, now).unwrap().id.clone();
        let b = list.push_front("dup", Priority::None, now).unwrap().id.clone();
        assert_ne!(a, b);
    }

    #[test]
    fn reorder_forward_lands_after_target() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        let (a, c) = (id_of(&list, "a"), id_of(&list, "c"));

        assert!(list.reorder(&a, &c));
        assert_eq!(texts(&list), ["b", "c", "a", "d"]);
    }

    #[test]
    fn reorder_backward_lands_before_target() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        let (d, b) = (id_of(&list, "d"), id_of(&list, "b"));

        assert!(list.reorder(&d, &b));
        assert_eq!(texts(&list), ["a", "d", "b", "c"]);
    }

    #[test]
    fn reorder_back_and_forth_is_not_an_inverse() {
        let mut list = list_of(&["a", "b", "c"]);
        let (a, c) = (id_of(&list, "a"), id_of(&list, "c"));

        list.reorder(&a, &c);
        list.reorder(&c, &a);
        assert_eq!(texts(&list), ["b", "a", "c"]);
    }

    #[test]
    fn reorder_noops() {
        let mut list = list_of(&["a", "b"]);
        let before = list.clone();
        let a = id_of(&list, "a");
        let missing: TaskId = "t-00000000".parse().unwrap();

        assert!(!list.reorder(&a, &a));
        assert!(!list.reorder(&a, &missing));
        assert!(!list.reorder(&missing, &a));
        assert_eq!(list, before);
    }

    #[test]
    fn clear_completed_keeps_order() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        list.toggle(&id_of(&list, "b"));
        list.toggle(&id_of(&list, "d"));

        assert_eq!(list.clear_completed(), 2);
        assert_eq!(texts(&list), ["a", "c"]);
        assert_eq!(list.clear_completed(), 0);
    }

    #[test]
    fn edit_and_priority_on_missing_id_are_noops() {
        let mut list = list_of(&["a"]);
        let missing: TaskId = "t-00000000".parse().unwrap();
        assert!(!list.edit(&missing, "b"));
        assert!(!list.set_priority(&missing, Priority::High));
        assert!(!list.toggle(&missing));
        assert!(list.remove(&missing).is_none());
    }

    #[test]
    fn from_tasks_rejects_duplicates_and_blank_text() {
        let list = list_of(&["a", "b"]);
        let mut tasks: Vec<Task> = list.into();
        assert!(TaskList::from_tasks(tasks.clone()).is_some());

        let mut blank = tasks.clone();
        blank[0].text = "  ".to_string();
        assert!(TaskList::from_tasks(blank).is_none());

        tasks[1].id = tasks[0].id.clone();
        assert!(TaskList::from_tasks(tasks).is_none());
    }
}
