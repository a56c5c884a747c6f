//! Drag-and-drop gesture state
//!
//! Tracks at most one dragged task and one hovered target. The session never
//! touches the list itself: a completed drop yields a [`Reorder`] for the
//! store to apply.

use super::filter::Filter;
use super::id::TaskId;
use super::list::TaskList;

/// A reorder requested by a completed drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reorder {
    pub dragged: TaskId,
    pub target: TaskId,
}

/// Gesture state for one pick-up / hover / drop cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSession {
    dragged: Option<TaskId>,
    hovered: Option<TaskId>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts dragging `id`. Only the unfiltered view can be reordered, and
    /// only live tasks can be picked up. Returns true if the drag started.
    pub fn pick_up(&mut self, id: &TaskId, filter: Filter, list: &TaskList) -> bool {
        self.cancel();
        if filter != Filter::All || !list.contains(id) {
            return false;
        }
        self.dragged = Some(id.clone());
        true
    }

    /// Sets the task currently under the pointer. Ignored when nothing is
    /// being dragged.
    pub fn hover(&mut self, id: &TaskId) {
        if self.dragged.is_some() {
            self.hovered = Some(id.clone());
        }
    }

    /// Pointer left the hovered task
    pub fn leave(&mut self) {
        self.hovered = None;
    }

    /// Ends the gesture. Yields a reorder only when both a dragged task and a
    /// distinct target were set; the session is cleared either way.
    pub fn drop(&mut self) -> Option<Reorder> {
        let dragged = self.dragged.take();
        let hovered = self.hovered.take();

        match (dragged, hovered) {
            (Some(dragged), Some(target)) if dragged != target => Some(Reorder { dragged, target }),
            _ => None,
        }
    }

    /// Abandons the gesture without reordering
    pub fn cancel(&mut self) {
        self.dragged = None;
        self.hovered = None;
    }

    pub fn dragged(&self) -> Option<&TaskId> {
        self.dragged.as_ref()
    }

    pub fn hovered(&self) -> Option<&TaskId> {
        self.hovered.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.dragged.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use chrono::Utc;

    fn two_tasks() -> (TaskList, TaskId, TaskId) {
        let mut list = TaskList::new();
        let now = Utc::now();
        let b = list.push_front("b", Priority::None, now).unwrap().id.clone();
        let a = list.push_front("a", Priority::None, now).unwrap().id.clone();
        (list, a, b)
    }

    #[test]
    fn full_gesture_yields_reorder() {
        let (list, a, b) = two_tasks();
        let mut drag = DragSession::new();

        assert!(drag.pick_up(&a, Filter::All, &list));
        drag.hover(&b);

        assert_eq!(
            drag.drop(),
            Some(Reorder {
                dragged: a,
                target: b
            })
        );
        assert!(!drag.is_active());
        assert!(drag.hovered().is_none());
    }

    #[test]
    fn drop_without_target_clears_state() {
        let (list, a, b) = two_tasks();
        let mut drag = DragSession::new();

        drag.pick_up(&a, Filter::All, &list);
        drag.hover(&b);
        drag.leave();

        assert_eq!(drag.drop(), None);
        assert_eq!(drag, DragSession::new());
    }

    #[test]
    fn drop_on_itself_is_nothing() {
        let (list, a, _) = two_tasks();
        let mut drag = DragSession::new();

        drag.pick_up(&a, Filter::All, &list);
        drag.hover(&a);
        assert_eq!(drag.drop(), None);
    }

    #[test]
    fn filtered_views_cannot_start_a_drag() {
        let (list, a, b) = two_tasks();
        let mut drag = DragSession::new();

        assert!(!drag.pick_up(&a, Filter::Active, &list));
        drag.hover(&b);
        assert!(drag.hovered().is_none());
        assert_eq!(drag.drop(), None);
    }

    #[test]
    fn cannot_pick_up_missing_task() {
        let (list, _, _) = two_tasks();
        let missing: TaskId = "t-00000000".parse().unwrap();
        let mut drag = DragSession::new();

        assert!(!drag.pick_up(&missing, Filter::All, &list));
        assert!(drag.dragged().is_none());
    }

    #[test]
    fn hover_replaces_previous_target() {
        let (list, a, b) = two_tasks();
        let mut drag = DragSession::new();

        drag.pick_up(&b, Filter::All, &list);
        drag.hover(&b);
        drag.hover(&a);
        assert_eq!(drag.hovered(), Some(&a));

        drag.cancel();
        assert!(!drag.is_active());
    }
}
