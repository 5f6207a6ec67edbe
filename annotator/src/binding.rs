//! Per-page controller: click handling and marker reconciliation.
//!
//! A `PageBinding` exists for every mounted page. It owns the markers drawn on
//! that page, keyed by annotation id, and nothing else. Whenever the store
//! changes, every binding hears about it and reconciles only if the change
//! touches its own page. Reconciliation is a set diff on ids: markers for ids
//! that disappeared are destroyed, new ids get a marker, and surviving markers
//! are updated in place.
//!
//! Marker intents (delete, drag start) are forwarded to the store and the drag
//! session. A drag started here is pinned to this binding's surface, so the
//! pointer is always measured against the page the marker lives on.

#[cfg(test)]
#[path = "binding_test.rs"]
mod binding_test;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::consts::ANNOTATION_PROMPT;
use crate::coords::{PageSurface, surface_percent};
use crate::drag::{DragError, DragSession};
use crate::input::{ListenerHost, PageClick, TextPrompt};
use crate::store::{Annotation, AnnotationId, AnnotationStore, StoreChange};

/// Failure reported by a marker implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("marker creation failed: {0}")]
    Create(String),
    #[error("marker update failed: {0}")]
    Update(String),
}

/// The on-screen representation of one annotation.
pub trait Marker {
    /// Whatever the host uses to identify the node a click landed on.
    type Target;

    /// Show the annotation's current text and position, and whether it is the
    /// one being dragged.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Update`] if the host could not apply the change.
    fn update(&mut self, annotation: &Annotation, dragging: bool) -> Result<(), MarkerError>;

    /// Whether `target` is this marker or one of its descendants.
    fn contains(&self, target: &Self::Target) -> bool;

    /// Remove the marker from the page. Called exactly once.
    fn destroy(&mut self);
}

/// Creates markers for one page.
pub trait MarkerFactory {
    type Marker: Marker;

    /// Build an empty marker for `annotation`. The binding calls
    /// [`Marker::update`] right after.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Create`] if the host could not build the marker.
    fn create_marker(&mut self, annotation: &Annotation) -> Result<Self::Marker, MarkerError>;
}

/// Click-target type for the markers a factory produces.
pub type MarkerTarget<F> = <<F as MarkerFactory>::Marker as Marker>::Target;

/// What one reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<AnnotationId>,
    pub updated: Vec<AnnotationId>,
    pub removed: Vec<AnnotationId>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Controller for a single rendered page.
pub struct PageBinding<F: MarkerFactory> {
    page_number: u32,
    surface: Rc<dyn PageSurface>,
    factory: F,
    markers: HashMap<AnnotationId, F::Marker>,
    click_listener: Box<dyn ListenerHost>,
    click_attached: bool,
}

impl<F: MarkerFactory> PageBinding<F> {
    /// Bind to a page and register its click listener.
    pub fn mount(
        page_number: u32,
        surface: Rc<dyn PageSurface>,
        factory: F,
        click_listener: Box<dyn ListenerHost>,
    ) -> Self {
        let mut binding = Self {
            page_number,
            surface,
            factory,
            markers: HashMap::new(),
            click_listener,
            click_attached: false,
        };
        binding.click_listener.register();
        binding.click_attached = true;
        binding
    }

    // --- Queries ---

    #[must_use]
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// The surface drags started from this page are measured against.
    #[must_use]
    pub fn surface(&self) -> Rc<dyn PageSurface> {
        Rc::clone(&self.surface)
    }

    /// Whether the page click listener is registered.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.click_attached
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn has_marker(&self, id: &AnnotationId) -> bool {
        self.markers.contains_key(id)
    }

    #[must_use]
    pub fn marker(&self, id: &AnnotationId) -> Option<&F::Marker> {
        self.markers.get(id)
    }

    /// Whether a click target lies on any live marker of this page.
    #[must_use]
    pub fn is_click_on_marker(&self, target: &MarkerTarget<F>) -> bool {
        self.markers.values().any(|marker| marker.contains(target))
    }

    // --- Page interaction ---

    /// Handle a click on the page surface.
    ///
    /// Clicks on a marker and clicks during a drag are ignored. Otherwise the
    /// user is asked for text and, if it is not blank, a new annotation is
    /// created at the clicked point.
    pub fn handle_click(
        &self,
        click: &PageClick<MarkerTarget<F>>,
        store: &mut AnnotationStore,
        drag: &DragSession,
        prompt: &mut dyn TextPrompt,
    ) -> Option<Annotation> {
        if click.target.as_ref().is_some_and(|target| self.is_click_on_marker(target)) {
            return None;
        }
        if drag.is_dragging() {
            return None;
        }

        let text = prompt.request_text(ANNOTATION_PROMPT)?;
        if text.trim().is_empty() {
            return None;
        }
        let position = surface_percent(click.client, &*self.surface);
        store.create(self.page_number, position.x, position.y, &text)
    }

    /// Forward a marker's delete control to the store.
    pub fn request_delete(&self, id: &AnnotationId, store: &mut AnnotationStore) -> bool {
        store.delete(id)
    }

    /// Forward a marker's drag handle to the drag session, pinned to this page.
    ///
    /// # Errors
    ///
    /// Propagates [`DragError`] from [`DragSession::begin`].
    pub fn request_drag_start(
        &self,
        id: AnnotationId,
        store: &AnnotationStore,
        drag: &mut DragSession,
    ) -> Result<(), DragError> {
        drag.begin(store, id, self.surface())
    }

    // --- Reconciliation ---

    /// React to a store change. Returns `None` when the change is about
    /// another page.
    pub fn on_store_changed(
        &mut self,
        change: &StoreChange,
        store: &AnnotationStore,
        active: Option<AnnotationId>,
    ) -> Option<ReconcileReport> {
        if !change.touches_page(self.page_number) {
            return None;
        }
        Some(self.reconcile(&store.list_for_page(self.page_number), active))
    }

    /// Bring the live markers in line with `annotations`.
    ///
    /// Records for other pages are skipped. `active` is the id being dragged.
    pub fn reconcile(&mut self, annotations: &[Annotation], active: Option<AnnotationId>) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let page_number = self.page_number;
        let desired: HashSet<AnnotationId> = annotations
            .iter()
            .filter(|a| a.page_number == page_number)
            .map(|a| a.id)
            .collect();

        let stale: Vec<AnnotationId> = self.markers.keys().filter(|id| !desired.contains(id)).copied().collect();
        for id in stale {
            if let Some(mut marker) = self.markers.remove(&id) {
                marker.destroy();
                report.removed.push(id);
            }
        }

        for annotation in annotations.iter().filter(|a| a.page_number == page_number) {
            let dragging = active == Some(annotation.id);
            if let Some(marker) = self.markers.get_mut(&annotation.id) {
                if let Err(e) = marker.update(annotation, dragging) {
                    log::warn!("page {page_number}: {e}");
                }
                report.updated.push(annotation.id);
                continue;
            }

            match self.factory.create_marker(annotation) {
                Ok(mut marker) => {
                    if let Err(e) = marker.update(annotation, dragging) {
                        log::warn!("page {page_number}: {e}");
                    }
                    self.markers.insert(annotation.id, marker);
                    report.created.push(annotation.id);
                }
                Err(e) => log::warn!("page {page_number}: {e}"),
            }
        }

        report
    }

    /// Recompute the drag highlight of every live marker on this page.
    pub fn refresh_drag_highlight(&mut self, store: &AnnotationStore, active: Option<AnnotationId>) {
        for (id, marker) in &mut self.markers {
            let Some(annotation) = store.get(id) else {
                continue;
            };
            if let Err(e) = marker.update(annotation, active == Some(*id)) {
                log::warn!("page {}: {e}", self.page_number);
            }
        }
    }

    // --- Teardown ---

    /// Destroy every marker and unregister the page click listener.
    pub fn teardown(&mut self) {
        for (_, mut marker) in self.markers.drain() {
            marker.destroy();
        }
        if self.click_attached {
            self.click_listener.unregister();
            self.click_attached = false;
        }
    }
}

impl<F: MarkerFactory> Drop for PageBinding<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}
