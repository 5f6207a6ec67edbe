//! Browser bindings: `web-sys` implementations of the host capabilities.
//!
//! This is the only module that touches the DOM. It provides:
//!
//! - [`PageSurface`] for any [`Element`], read from `getBoundingClientRect`.
//! - [`BrowserPrompt`], a [`TextPrompt`] backed by `window.prompt`.
//! - [`DomMarkerFactory`] / [`DomMarker`], which draw each annotation as an
//!   absolutely positioned element inside its page.
//! - [`DomListeners`], a [`ListenerHost`] that owns a set of JS closures.
//! - [`open`] and [`mount_page`], which wire window and page events into a
//!   shared [`DocumentView`].
//!
//! Page listeners are delegated: one `click` and one `mousedown` listener per
//! page decode marker intents from `data-annotation-*` attributes, so markers
//! themselves carry no listeners and can be destroyed at any time.
//!
//! Fallible DOM calls never panic. Marker failures surface as [`MarkerError`];
//! listener failures are logged.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use uuid::Uuid;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, EventTarget, HtmlElement, KeyboardEvent, MouseEvent, Node, Window};

use crate::binding::{Marker, MarkerError, MarkerFactory, ReconcileReport};
use crate::coords::{PageSurface, Point, Rect};
use crate::doc::Document;
use crate::input::{Key, ListenerHost, MarkerAction, PageClick, TextPrompt};
use crate::store::{Annotation, AnnotationId};
use crate::view::{DocumentView, ViewError};

/// Attribute holding the annotation id on a marker root.
pub const ID_ATTR: &str = "data-annotation-id";

/// Attribute naming the action of a marker control.
pub const ACTION_ATTR: &str = "data-annotation-action";

const MARKER_CLASS: &str = "annotation";
const DRAGGING_CLASS: &str = "annotation--dragging";

/// A document view driven by the DOM.
pub type DomDocumentView = DocumentView<DomMarkerFactory>;

/// Shared handle the host keeps for as long as the document is open.
pub type SharedView = Rc<RefCell<DomDocumentView>>;

fn describe(value: &JsValue) -> String {
    format!("{value:?}")
}

// =============================================================
// Surfaces and prompts
// =============================================================

impl PageSurface for Element {
    fn bounding_rect(&self) -> Rect {
        let rect = self.get_bounding_client_rect();
        Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }
}

/// Asks for annotation text with the browser's modal prompt.
pub struct BrowserPrompt {
    window: Window,
}

impl BrowserPrompt {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl TextPrompt for BrowserPrompt {
    fn request_text(&mut self, message: &str) -> Option<String> {
        match self.window.prompt_with_message(message) {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("prompt failed: {}", describe(&e));
                None
            }
        }
    }
}

// =============================================================
// Markers
// =============================================================

/// Draws markers into one page element.
pub struct DomMarkerFactory {
    page: Element,
}

impl DomMarkerFactory {
    #[must_use]
    pub fn new(page: Element) -> Self {
        Self { page }
    }

    fn element(&self, tag: &str, class: &str) -> Result<Element, MarkerError> {
        let Some(document) = self.page.owner_document() else {
            return Err(MarkerError::Create("page element is detached".into()));
        };
        let element = document.create_element(tag).map_err(|e| MarkerError::Create(describe(&e)))?;
        element.set_class_name(class);
        Ok(element)
    }
}

impl MarkerFactory for DomMarkerFactory {
    type Marker = DomMarker;

    fn create_marker(&mut self, annotation: &Annotation) -> Result<DomMarker, MarkerError> {
        let create = |e: JsValue| MarkerError::Create(describe(&e));

        let root = match self.element("div", MARKER_CLASS)?.dyn_into::<HtmlElement>() {
            Ok(root) => root,
            Err(_) => return Err(MarkerError::Create("marker root is not an HTML element".into())),
        };
        root.set_attribute(ID_ATTR, &annotation.id.to_string()).map_err(create)?;

        let handle = self.element("span", "annotation__handle")?;
        handle.set_attribute(ACTION_ATTR, MarkerAction::DragStart.as_str()).map_err(create)?;
        let text = self.element("span", "annotation__text")?;
        let delete = self.element("button", "annotation__delete")?;
        delete.set_attribute("type", "button").map_err(create)?;
        delete.set_attribute(ACTION_ATTR, MarkerAction::Delete.as_str()).map_err(create)?;
        delete.set_text_content(Some("×"));

        for child in [&handle, &text, &delete] {
            root.append_child(child).map_err(create)?;
        }
        self.page.append_child(&root).map_err(create)?;

        Ok(DomMarker { id: annotation.id, root, text })
    }
}

/// One annotation drawn as `div.annotation` with a drag handle, the text, and
/// a delete button.
pub struct DomMarker {
    id: AnnotationId,
    root: HtmlElement,
    text: Element,
}

impl DomMarker {
    #[must_use]
    pub fn id(&self) -> AnnotationId {
        self.id
    }
}

impl Marker for DomMarker {
    type Target = Node;

    fn update(&mut self, annotation: &Annotation, dragging: bool) -> Result<(), MarkerError> {
        let update = |e: JsValue| MarkerError::Update(describe(&e));
        self.text.set_text_content(Some(&annotation.text));
        let style = self.root.style();
        style.set_property("left", &format!("{}%", annotation.x)).map_err(update)?;
        style.set_property("top", &format!("{}%", annotation.y)).map_err(update)?;
        self.root.class_list().toggle_with_force(DRAGGING_CLASS, dragging).map_err(update)?;
        Ok(())
    }

    fn contains(&self, target: &Node) -> bool {
        self.root.contains(Some(target))
    }

    fn destroy(&mut self) {
        self.root.remove();
    }
}

/// Decode the marker control under `target`: the annotation id from the
/// enclosing marker root and the action from the control itself.
#[must_use]
pub fn marker_intent(target: &Element) -> Option<(AnnotationId, MarkerAction)> {
    let control = closest(target, ACTION_ATTR)?;
    let action = MarkerAction::from_name(&control.get_attribute(ACTION_ATTR)?)?;
    let root = closest(&control, ID_ATTR)?;
    let raw = root.get_attribute(ID_ATTR)?;
    match Uuid::parse_str(&raw) {
        Ok(id) => Some((id, action)),
        Err(e) => {
            log::debug!("bad annotation id {raw:?}: {e}");
            None
        }
    }
}

fn closest(element: &Element, attribute: &str) -> Option<Element> {
    match element.closest(&format!("[{attribute}]")) {
        Ok(found) => found,
        Err(e) => {
            log::debug!("selector lookup failed: {}", describe(&e));
            None
        }
    }
}

// =============================================================
// Listeners
// =============================================================

type Handler = Closure<dyn FnMut(Event)>;

/// A set of DOM event listeners on one target, registered as a unit.
///
/// The closures live as long as this value. Dropping it removes any
/// listeners still registered.
pub struct DomListeners {
    target: EventTarget,
    handlers: Vec<(&'static str, Handler)>,
    registered: bool,
}

impl DomListeners {
    #[must_use]
    pub fn new(target: EventTarget) -> Self {
        Self { target, handlers: Vec::new(), registered: false }
    }

    /// Add a handler for `event`. Takes effect on the next registration.
    #[must_use]
    pub fn on(mut self, event: &'static str, handler: impl FnMut(Event) + 'static) -> Self {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        self.handlers.push((event, closure));
        self
    }
}

impl ListenerHost for DomListeners {
    fn register(&mut self) {
        for (event, handler) in &self.handlers {
            let callback: &Function = handler.as_ref().unchecked_ref();
            if let Err(e) = self.target.add_event_listener_with_callback(event, callback) {
                log::warn!("failed to add {event} listener: {}", describe(&e));
            }
        }
        self.registered = true;
    }

    fn unregister(&mut self) {
        for (event, handler) in &self.handlers {
            let callback: &Function = handler.as_ref().unchecked_ref();
            if let Err(e) = self.target.remove_event_listener_with_callback(event, callback) {
                log::warn!("failed to remove {event} listener: {}", describe(&e));
            }
        }
        self.registered = false;
    }
}

impl Drop for DomListeners {
    fn drop(&mut self) {
        if self.registered {
            self.unregister();
        }
    }
}

// =============================================================
// Wiring
// =============================================================

fn with_view(view: &Weak<RefCell<DomDocumentView>>, f: impl FnOnce(&mut DomDocumentView)) {
    let Some(view) = view.upgrade() else {
        return;
    };
    match view.try_borrow_mut() {
        Ok(mut view) => f(&mut view),
        Err(e) => log::debug!("event dropped: {e}"),
    }
}

fn client_point(event: &MouseEvent) -> Point {
    Point::new(f64::from(event.client_x()), f64::from(event.client_y()))
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_ref::<Element>().cloned()
}

/// Window-level listeners feeding pointer moves, pointer release and the
/// cancel key into `view`.
#[must_use]
pub fn window_listeners(window: &Window, view: Weak<RefCell<DomDocumentView>>) -> DomListeners {
    let on_move = view.clone();
    let on_up = view.clone();
    let on_key = view;
    DomListeners::new(window.clone().into())
        .on("mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                with_view(&on_move, |view| {
                    view.on_pointer_move(client_point(event));
                });
            }
        })
        .on("mouseup", move |_event| {
            with_view(&on_up, |view| {
                view.on_pointer_up();
            });
        })
        .on("keydown", move |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                with_view(&on_key, |view| {
                    view.on_key_down(&Key(event.key()));
                });
            }
        })
}

/// Delegated listeners for one page element: clicks create annotations or hit
/// a marker's delete control, and presses on a drag handle start a drag.
#[must_use]
pub fn page_listeners(page: &Element, page_number: u32, view: Weak<RefCell<DomDocumentView>>) -> DomListeners {
    let on_click = view.clone();
    let on_down = view;
    DomListeners::new(page.clone().into())
        .on("click", move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let target = event_element(&event);
            if let Some((id, MarkerAction::Delete)) = target.as_ref().and_then(marker_intent) {
                event.stop_propagation();
                with_view(&on_click, |view| {
                    view.on_marker_delete(page_number, id);
                });
                return;
            }
            let click = PageClick::new(client_point(mouse), target.map(Node::from));
            with_view(&on_click, |view| {
                view.on_page_click(page_number, &click);
            });
        })
        .on("mousedown", move |event| {
            let Some((id, MarkerAction::DragStart)) = event_element(&event).as_ref().and_then(marker_intent) else {
                return;
            };
            event.prevent_default();
            event.stop_propagation();
            with_view(&on_down, |view| {
                if let Err(e) = view.on_marker_drag_start(page_number, id) {
                    log::debug!("drag not started: {e}");
                }
            });
        })
}

/// Open `document` in a new view wired to `window`.
#[must_use]
pub fn open(document: Document, window: &Window) -> SharedView {
    let view = Rc::new(RefCell::new(DocumentView::new(document, Box::new(BrowserPrompt::new(window.clone())))));
    let listeners = window_listeners(window, Rc::downgrade(&view));
    view.borrow_mut().set_window_listeners(Box::new(listeners));
    view
}

/// Bind a rendered page element to `view`.
///
/// # Errors
///
/// Propagates [`ViewError::UnknownPage`] and [`ViewError::Closed`] from
/// [`DocumentView::mount_page`].
pub fn mount_page(view: &SharedView, page_number: u32, page: &Element) -> Result<ReconcileReport, ViewError> {
    let listeners = page_listeners(page, page_number, Rc::downgrade(view));
    let surface: Rc<dyn PageSurface> = Rc::new(page.clone());
    view.borrow_mut().mount_page(page_number, surface, DomMarkerFactory::new(page.clone()), Box::new(listeners))
}
