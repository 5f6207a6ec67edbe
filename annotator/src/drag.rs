//! The exclusive drag session.
//!
//! At most one annotation is ever being dragged. `DragSession` records which
//! annotation that is, the page surface whose bounding box positions it, and
//! where it started so a cancelled drag can be reverted. Window-level pointer
//! listeners feed [`DragSession::on_pointer_move`] and [`DragSession::end`],
//! and the cancel key feeds [`DragSession::cancel`]. The session attaches
//! them at most once per document view and detaches them when the view is
//! torn down.
//!
//! The session never owns annotations. Every position write goes through
//! [`AnnotationStore::update_position`], which ignores ids that were deleted
//! mid-drag.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use std::rc::Rc;

use crate::coords::{PageSurface, Point, surface_percent};
use crate::input::ListenerHost;
use crate::store::{AnnotationId, AnnotationStore};

/// Why a drag could not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("annotation not found: {0}")]
    UnknownAnnotation(AnnotationId),
    #[error("annotation {active} is already being dragged")]
    AlreadyDragging { active: AnnotationId },
}

/// Internal state for the drag state machine.
#[derive(Clone, Default)]
enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// One annotation follows the pointer.
    Dragging {
        /// Id of the annotation being dragged.
        id: AnnotationId,
        /// Surface whose bounding box converts pointer positions.
        page: Rc<dyn PageSurface>,
        /// Position at the start of the drag, used to revert on cancel.
        origin: Point,
    },
}

/// Process-wide single-slot drag state plus its window listener guard.
#[derive(Default)]
pub struct DragSession {
    state: DragState,
    listeners_attached: bool,
}

impl DragSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Transitions ---

    /// Start dragging `id`, converting later pointer positions against `page`.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::UnknownAnnotation`] if the store has no such id and
    /// [`DragError::AlreadyDragging`] if another drag is active. The session is
    /// unchanged in both cases.
    pub fn begin(
        &mut self,
        store: &AnnotationStore,
        id: AnnotationId,
        page: Rc<dyn PageSurface>,
    ) -> Result<(), DragError> {
        if let Some(active) = self.active_id() {
            return Err(DragError::AlreadyDragging { active });
        }
        let Some(annotation) = store.get(&id) else {
            return Err(DragError::UnknownAnnotation(id));
        };
        let origin = Point::new(annotation.x, annotation.y);
        self.state = DragState::Dragging { id, page, origin };
        Ok(())
    }

    /// Move the dragged annotation under the pointer. Returns whether the
    /// store was written; always `false` while idle.
    pub fn on_pointer_move(&mut self, store: &mut AnnotationStore, pointer: Point) -> bool {
        let DragState::Dragging { id, page, .. } = &self.state else {
            return false;
        };
        let position = surface_percent(pointer, &**page);
        store.update_position(id, position.x, position.y)
    }

    /// Return to idle. Returns the id that was being dragged, if any.
    pub fn end(&mut self) -> Option<AnnotationId> {
        let previous = self.active_id();
        self.state = DragState::Idle;
        previous
    }

    /// Abort the drag and put the annotation back where it started. Returns
    /// the id that was being dragged, if any.
    pub fn cancel(&mut self, store: &mut AnnotationStore) -> Option<AnnotationId> {
        let DragState::Dragging { id, origin, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        store.update_position(&id, origin.x, origin.y);
        Some(id)
    }

    // --- Queries ---

    /// Id of the annotation being dragged, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<AnnotationId> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { id, .. } => Some(*id),
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Whether `id` is the annotation currently being dragged.
    #[must_use]
    pub fn is_dragging_id(&self, id: &AnnotationId) -> bool {
        self.active_id().as_ref() == Some(id)
    }

    // --- Window listeners ---

    /// Register the window listeners (pointer move, pointer up, and the cancel
    /// key) unless already registered.
    /// Returns whether this call registered them.
    pub fn attach_listeners(&mut self, host: &mut dyn ListenerHost) -> bool {
        if self.listeners_attached {
            return false;
        }
        host.register();
        self.listeners_attached = true;
        true
    }

    /// Remove the window listeners if registered. Returns whether this
    /// call removed them.
    pub fn detach_listeners(&mut self, host: &mut dyn ListenerHost) -> bool {
        if !self.listeners_attached {
            return false;
        }
        host.unregister();
        self.listeners_attached = false;
        true
    }

    #[must_use]
    pub fn listeners_attached(&self) -> bool {
        self.listeners_attached
    }
}
