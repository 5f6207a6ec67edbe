//! Document view: the top-level controller for one open document.
//!
//! `DocumentView` owns everything with a document-view lifetime: the
//! annotation store, the drag session, the page bindings of every mounted page,
//! the window listener set, the text prompt, and the zoom level. The host
//! forwards raw events to it; it routes each one to the right binding or to the
//! drag session and then delivers the resulting store changes to every binding.
//!
//! Store changes are queued by a subscription and drained after each event
//! rather than delivered from inside the store call, so no binding ever runs
//! while the store is mid-mutation.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::binding::{MarkerFactory, MarkerTarget, PageBinding, ReconcileReport};
use crate::consts::CANCEL_KEY;
use crate::coords::{PageSurface, Point};
use crate::doc::Document;
use crate::drag::{DragError, DragSession};
use crate::input::{Key, ListenerHost, NoListeners, PageClick, TextPrompt};
use crate::store::{Annotation, AnnotationId, AnnotationStore, StoreChange, SubscriptionId};
use crate::zoom::Zoom;

/// Why a view operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("document has no page {0}")]
    UnknownPage(u32),
    #[error("page {0} is not mounted")]
    PageNotMounted(u32),
    #[error("annotation {id} is not on page {page}")]
    NotOnPage { id: AnnotationId, page: u32 },
    #[error("document view is closed")]
    Closed,
    #[error(transparent)]
    Drag(#[from] DragError),
}

/// Controller for one open document.
pub struct DocumentView<F: MarkerFactory> {
    document: Document,
    store: AnnotationStore,
    drag: DragSession,
    pages: BTreeMap<u32, PageBinding<F>>,
    window_listeners: Box<dyn ListenerHost>,
    prompt: Box<dyn TextPrompt>,
    zoom: Zoom,
    pending: Rc<RefCell<Vec<StoreChange>>>,
    subscription: Option<SubscriptionId>,
    highlighted: Option<AnnotationId>,
}

impl<F: MarkerFactory> DocumentView<F> {
    /// Open `document`, loading any annotations it carries.
    pub fn new(mut document: Document, prompt: Box<dyn TextPrompt>) -> Self {
        let mut store = AnnotationStore::new();
        let saved = std::mem::take(&mut document.annotations);
        let kept = store.load(saved);
        log::debug!("opened document {} with {kept} annotations", document.id);

        let pending: Rc<RefCell<Vec<StoreChange>>> = Rc::default();
        let queue = Rc::clone(&pending);
        let subscription = store.subscribe(move |change| queue.borrow_mut().push(change.clone()));

        Self {
            document,
            store,
            drag: DragSession::new(),
            pages: BTreeMap::new(),
            window_listeners: Box::new(NoListeners),
            prompt,
            zoom: Zoom::default(),
            pending,
            subscription: Some(subscription),
            highlighted: None,
        }
    }

    // --- Wiring ---

    /// Install the window pointer/key listener set. If the previous set was
    /// registered, it is removed and the new one registered in its place.
    pub fn set_window_listeners(&mut self, host: Box<dyn ListenerHost>) {
        let was_attached = self.drag.detach_listeners(&mut *self.window_listeners);
        self.window_listeners = host;
        if was_attached {
            self.drag.attach_listeners(&mut *self.window_listeners);
        }
    }

    /// Bind a rendered page and draw its markers.
    ///
    /// The window listeners are registered on the first mount. Mounting a
    /// page that is already mounted replaces the old binding.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Closed`] after [`DocumentView::close`] and
    /// [`ViewError::UnknownPage`] if the document has no such page.
    pub fn mount_page(
        &mut self,
        page_number: u32,
        surface: Rc<dyn PageSurface>,
        factory: F,
        click_listener: Box<dyn ListenerHost>,
    ) -> Result<ReconcileReport, ViewError> {
        if self.is_closed() {
            return Err(ViewError::Closed);
        }
        if !self.document.has_page(page_number) {
            return Err(ViewError::UnknownPage(page_number));
        }
        if self.pages.remove(&page_number).is_some() {
            log::debug!("remounting page {page_number}");
        }
        self.drag.attach_listeners(&mut *self.window_listeners);

        let mut binding = PageBinding::mount(page_number, surface, factory, click_listener);
        let report = binding.reconcile(&self.store.list_for_page(page_number), self.drag.active_id());
        self.pages.insert(page_number, binding);
        Ok(report)
    }

    /// Tear down one page's binding. Returns whether it was mounted.
    pub fn unmount_page(&mut self, page_number: u32) -> bool {
        self.pages.remove(&page_number).is_some()
    }

    // --- Page and marker events ---

    /// A click on page `page_number`. Returns the annotation it created.
    pub fn on_page_click(
        &mut self,
        page_number: u32,
        click: &PageClick<MarkerTarget<F>>,
    ) -> Option<Annotation> {
        if self.is_closed() {
            return None;
        }
        let binding = self.pages.get(&page_number)?;
        let created = binding.handle_click(click, &mut self.store, &self.drag, &mut *self.prompt);
        self.flush();
        created
    }

    /// The drag handle of marker `id` on page `page_number` was pressed.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Closed`] after close, [`ViewError::PageNotMounted`]
    /// for an unmounted page, [`ViewError::NotOnPage`] when `id` belongs to
    /// another page, and [`ViewError::Drag`] if the drag session refused.
    pub fn on_marker_drag_start(&mut self, page_number: u32, id: AnnotationId) -> Result<(), ViewError> {
        if self.is_closed() {
            return Err(ViewError::Closed);
        }
        let binding = self.pages.get(&page_number).ok_or(ViewError::PageNotMounted(page_number))?;
        if !self.is_on_page(&id, page_number) {
            return Err(ViewError::NotOnPage { id, page: page_number });
        }
        binding.request_drag_start(id, &self.store, &mut self.drag)?;
        self.sync_highlight();
        Ok(())
    }

    /// The delete control of marker `id` on page `page_number` was activated.
    /// Deleting the dragged annotation ends the drag. An id that lives on
    /// another page is left alone.
    pub fn on_marker_delete(&mut self, page_number: u32, id: AnnotationId) -> bool {
        if self.is_closed() || !self.is_on_page(&id, page_number) {
            return false;
        }
        let Some(binding) = self.pages.get(&page_number) else {
            return false;
        };
        let deleted = binding.request_delete(&id, &mut self.store);
        if deleted && self.drag.is_dragging_id(&id) {
            self.drag.end();
        }
        self.flush();
        self.sync_highlight();
        deleted
    }

    // --- Window events ---

    /// Pointer moved anywhere in the window.
    pub fn on_pointer_move(&mut self, pointer: Point) -> bool {
        if self.is_closed() {
            return false;
        }
        let moved = self.drag.on_pointer_move(&mut self.store, pointer);
        self.flush();
        moved
    }

    /// Pointer released anywhere in the window. Returns the id that was
    /// being dragged.
    pub fn on_pointer_up(&mut self) -> Option<AnnotationId> {
        let ended = self.drag.end();
        self.sync_highlight();
        ended
    }

    /// Key pressed. Escape cancels an active drag and restores the start
    /// position; other keys are ignored.
    pub fn on_key_down(&mut self, key: &Key) -> Option<AnnotationId> {
        if self.is_closed() || key.0 != CANCEL_KEY {
            return None;
        }
        let cancelled = self.drag.cancel(&mut self.store);
        self.flush();
        self.sync_highlight();
        cancelled
    }

    // --- Zoom ---

    #[must_use]
    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn zoom_in(&mut self) -> Zoom {
        self.zoom.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Zoom {
        self.zoom.zoom_out()
    }

    // --- Save ---

    /// The document with the current annotation set attached.
    #[must_use]
    pub fn save(&self) -> Document {
        let mut document = self.document.clone();
        document.annotations = self.store.list_all();
        match serde_json::to_string(&document) {
            Ok(json) => log::info!("document saved: {json}"),
            Err(e) => log::warn!("document {} saved but not serializable: {e}", document.id),
        }
        document
    }

    // --- Queries ---

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    #[must_use]
    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    #[must_use]
    pub fn annotations(&self) -> Vec<Annotation> {
        self.store.list_all()
    }

    #[must_use]
    pub fn annotations_for_page(&self, page_number: u32) -> Vec<Annotation> {
        self.store.list_for_page(page_number)
    }

    #[must_use]
    pub fn page(&self, page_number: u32) -> Option<&PageBinding<F>> {
        self.pages.get(&page_number)
    }

    #[must_use]
    pub fn mounted_pages(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    /// Whether [`DocumentView::close`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.subscription.is_none()
    }

    // --- Teardown ---

    /// Tear down every page, remove the window listeners, and stop listening
    /// to the store. Safe to call more than once.
    pub fn close(&mut self) {
        self.drag.end();
        self.highlighted = None;
        self.pages.clear();
        self.drag.detach_listeners(&mut *self.window_listeners);
        if let Some(subscription) = self.subscription.take() {
            self.store.unsubscribe(subscription);
            log::debug!("closed document {}", self.document.id);
        }
        self.pending.borrow_mut().clear();
    }

    // --- Internals ---

    /// Unknown ids count as on-page so the drag session reports them itself.
    fn is_on_page(&self, id: &AnnotationId, page_number: u32) -> bool {
        self.store.get(id).is_none_or(|a| a.page_number == page_number)
    }

    /// Deliver queued store changes to every binding.
    fn flush(&mut self) {
        let changes = std::mem::take(&mut *self.pending.borrow_mut());
        let active = self.drag.active_id();
        for change in &changes {
            for binding in self.pages.values_mut() {
                binding.on_store_changed(change, &self.store, active);
            }
        }
    }

    /// Recompute drag highlights on every page when the active id changed.
    fn sync_highlight(&mut self) {
        let active = self.drag.active_id();
        if active == self.highlighted {
            return;
        }
        for binding in self.pages.values_mut() {
            binding.refresh_drag_highlight(&self.store, active);
        }
        self.highlighted = active;
    }
}

impl<F: MarkerFactory> Drop for DocumentView<F> {
    fn drop(&mut self) {
        self.close();
    }
}
