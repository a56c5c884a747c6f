//! Task CLI commands

use std::path::Path;

use anyhow::{bail, Context, Result};

use super::output::{items_left, Output};
use crate::decompose::{self, Composer, SubmitError, SubmitOutcome};
use crate::domain::{normalize_text, DragSession, Filter, Priority, TaskId};
use crate::storage::{Config, JsonlStore};
use crate::store::TaskListStore;

/// Opens the task list stored in `data_dir`
pub fn open_store(data_dir: &Path) -> TaskListStore {
    TaskListStore::open(JsonlStore::in_dir(data_dir))
}

/// Resolves a full ID or unique prefix to a live task
fn resolve(store: &TaskListStore, reference: &str) -> Result<TaskId> {
    let matches = store.list().find_by_prefix(reference);
    match matches.as_slice() {
        [task] => Ok(task.id.clone()),
        [] => bail!("Task not found: {}", reference),
        _ => bail!(
            "Ambiguous task ID '{}' matches {} tasks",
            reference,
            matches.len()
        ),
    }
}

pub fn add(
    output: &Output,
    store: &mut TaskListStore,
    text: &str,
    priority: Priority,
) -> Result<()> {
    let task = match store.add(text, priority) {
        Some(task) => task,
        None => {
            output.verbose_ctx("add", "Blank text ignored");
            return Ok(());
        }
    };

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Added task: {} - {}", task.id, task.text));
    }

    Ok(())
}

pub fn add_split(
    output: &Output,
    store: &mut TaskListStore,
    config: &Config,
    data_dir: &Path,
    text: &str,
    priority: Priority,
) -> Result<()> {
    if normalize_text(text).is_none() {
        output.verbose_ctx("add", "Blank text ignored");
        return Ok(());
    }

    let decomposer = decompose::from_config(&config.decompose, data_dir)
        .context("Cannot split task")?;
    let mut composer = Composer::new(config.decompose.max_subtasks);

    let outcome = match composer.submit(text, priority, &*decomposer, store) {
        Ok(outcome) => outcome,
        Err(SubmitError::Empty) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    match outcome {
        SubmitOutcome::Split(tasks) => {
            if output.is_json() {
                output.data(&serde_json::json!({
                    "split": true,
                    "tasks": tasks,
                }));
            } else {
                output.success(&format!("Split into {} tasks:", tasks.len()));
                for task in &tasks {
                    output.task_row(task);
                }
            }
        }
        SubmitOutcome::Single(task) => {
            if output.is_json() {
                output.data(&serde_json::json!({
                    "split": false,
                    "tasks": [task],
                }));
            } else {
                output.success(&format!(
                    "No sub-tasks suggested. Added task: {} - {}",
                    task.id, task.text
                ));
            }
        }
        SubmitOutcome::Failed { text, notice } => {
            bail!("{}. Nothing was added: \"{}\"", notice, text)
        }
    }

    Ok(())
}

pub fn list(output: &Output, store: &TaskListStore, filter: Filter) -> Result<()> {
    let view = store.filtered_view(filter);
    let active = store.active_count();

    if output.is_json() {
        output.data(&serde_json::json!({
            "filter": filter.as_str(),
            "tasks": view,
            "active": active,
            "completed": store.completed_count(),
        }));
        return Ok(());
    }

    if view.is_empty() {
        println!("{}", filter.empty_message());
    } else {
        for task in &view {
            output.task_row(task);
        }
    }

    if !store.tasks().is_empty() {
        println!();
        println!("{}", items_left(active));
    }

    Ok(())
}

pub fn toggle(output: &Output, store: &mut TaskListStore, reference: &str) -> Result<()> {
    let id = resolve(store, reference)?;
    store.toggle_completion(&id);

    let task = store.get(&id).context("Task disappeared while toggling")?;

    if output.is_json() {
        output.data(task);
    } else if task.completed {
        output.success(&format!("Completed task: {}", task.id));
    } else {
        output.success(&format!("Reopened task: {}", task.id));
    }

    Ok(())
}

pub fn edit(
    output: &Output,
    store: &mut TaskListStore,
    reference: &str,
    text: &str,
) -> Result<()> {
    let id = resolve(store, reference)?;
    if normalize_text(text).is_none() {
        output.verbose_ctx("edit", "Blank text ignored, keeping the current text");
        return Ok(());
    }

    let changed = store.edit(&id, text);
    output.verbose_ctx("edit", &format!("changed={}", changed));

    let task = store.get(&id).context("Task disappeared while editing")?;
    if output.is_json() {
        output.data(task);
    } else if changed {
        output.success(&format!("Edited task: {} - {}", task.id, task.text));
    } else {
        output.success(&format!("Task unchanged: {}", task.id));
    }

    Ok(())
}

pub fn set_priority(
    output: &Output,
    store: &mut TaskListStore,
    reference: &str,
    priority: Priority,
) -> Result<()> {
    let id = resolve(store, reference)?;
    store.set_priority(&id, priority);

    if output.is_json() {
        let task = store.get(&id).context("Task disappeared while updating")?;
        output.data(task);
    } else {
        output.success(&format!("Set priority of {} to {}", id, priority));
    }

    Ok(())
}

pub fn remove(output: &Output, store: &mut TaskListStore, reference: &str) -> Result<()> {
    let id = resolve(store, reference)?;
    let task = match store.remove(&id) {
        Some(task) => task,
        None => bail!("Task not found: {}", id),
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "removed": task,
        }));
    } else {
        output.success(&format!("Removed task: {} - {}", task.id, task.text));
    }

    Ok(())
}

pub fn clear_completed(output: &Output, store: &mut TaskListStore) -> Result<()> {
    let removed = store.clear_completed();

    if output.is_json() {
        output.data(&serde_json::json!({
            "removed": removed,
            "remaining": store.tasks().len(),
        }));
    } else if removed == 0 {
        output.success("No completed tasks to clear");
    } else {
        output.success(&format!("Cleared {} completed task(s)", removed));
    }

    Ok(())
}

/// Moves `dragged` into `target`'s slot the same way a drag and drop does
pub fn move_task(
    output: &Output,
    store: &mut TaskListStore,
    dragged: &str,
    target: &str,
) -> Result<()> {
    let dragged = resolve(store, dragged)?;
    let target = resolve(store, target)?;

    let mut session = DragSession::new();
    if !session.pick_up(&dragged, Filter::All, store.list()) {
        bail!("Cannot move task: {}", dragged);
    }
    session.hover(&target);
    let moved = store.drop_drag(&mut session);

    if output.is_json() {
        output.data(&serde_json::json!({
            "moved": moved,
            "order": store.tasks().iter().map(|t| t.id.to_string()).collect::<Vec<_>>(),
        }));
    } else if moved {
        output.success(&format!("Moved {} to position of {}", dragged, target));
    } else {
        output.success("Task is already in place");
    }

    Ok(())
}

pub fn status(output: &Output, store: &TaskListStore) -> Result<()> {
    let active = store.active_count();
    let completed = store.completed_count();

    if output.is_json() {
        output.data(&serde_json::json!({
            "total": store.tasks().len(),
            "active": active,
            "completed": completed,
        }));
    } else {
        println!("Tasks: {}", store.tasks().len());
        println!("  Active:    {}", active);
        println!("  Completed: {}", completed);
        println!();
        println!("{}", items_left(active));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store_with(texts: &[&str]) -> TaskListStore {
        let mut store = TaskListStore::open(MemoryStore::new());
        for text in texts.iter().rev() {
            store.add(text, Priority::None);
        }
        store
    }

    #[test]
    fn resolve_full_id_and_prefix() {
        let store = store_with(&["a"]);
        let id = store.tasks()[0].id.clone();

        assert_eq!(resolve(&store, &id.to_string()).unwrap(), id);
        assert_eq!(resolve(&store, &id.hash()[..4]).unwrap(), id);
    }

    #[test]
    fn resolve_unknown_is_an_error() {
        let store = store_with(&["a"]);
        let err = resolve(&store, "t-zzzz").unwrap_err();
        assert!(err.to_string().contains("Task not found"));
    }

    #[test]
    fn resolve_empty_prefix_matches_nothing() {
        let store = store_with(&["a", "b"]);
        assert!(resolve(&store, "t-").is_err());
    }

    #[test]
    fn move_applies_splice() {
        let mut store = store_with(&["a", "b", "c"]);
        let a = store.tasks()[0].id.to_string();
        let c = store.tasks()[2].id.to_string();
        let output = Output::new(crate::storage::OutputFormat::Json, false);

        move_task(&output, &mut store, &a, &c).unwrap();

        let texts: Vec<_> = store.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["b", "c", "a"]);
    }
}
