//! In-memory fakes for the host capabilities, shared by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::binding::{Marker, MarkerError, MarkerFactory};
use crate::coords::{PageSurface, Rect};
use crate::input::{ListenerHost, TextPrompt};
use crate::store::{Annotation, AnnotationId};

/// Bounding box used throughout the tests: an 800×1200 page at the origin.
pub fn page_rect() -> Rect {
    Rect::new(0.0, 0.0, 800.0, 1200.0)
}

/// A page surface whose rectangle can be changed between calls.
pub struct FakeSurface {
    rect: Cell<Rect>,
    reads: Cell<u32>,
}

impl FakeSurface {
    pub fn new(rect: Rect) -> Rc<Self> {
        Rc::new(Self { rect: Cell::new(rect), reads: Cell::new(0) })
    }

    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }

    pub fn reads(&self) -> u32 {
        self.reads.get()
    }
}

impl PageSurface for FakeSurface {
    fn bounding_rect(&self) -> Rect {
        self.reads.set(self.reads.get() + 1);
        self.rect.get()
    }
}

/// Everything fake markers did, shared between a factory and its test.
#[derive(Debug, Default)]
pub struct MarkerLog {
    pub created: Vec<AnnotationId>,
    pub destroyed: Vec<AnnotationId>,
    pub updates: Vec<(AnnotationId, bool)>,
}

/// A marker made of two fake nodes: a root and one child.
#[derive(Debug)]
pub struct FakeMarker {
    pub id: AnnotationId,
    pub root: u32,
    pub child: u32,
    pub shown: Option<Annotation>,
    pub dragging: bool,
    log: Rc<RefCell<MarkerLog>>,
}

impl Marker for FakeMarker {
    type Target = u32;

    fn update(&mut self, annotation: &Annotation, dragging: bool) -> Result<(), MarkerError> {
        self.shown = Some(annotation.clone());
        self.dragging = dragging;
        self.log.borrow_mut().updates.push((annotation.id, dragging));
        Ok(())
    }

    fn contains(&self, target: &u32) -> bool {
        *target == self.root || *target == self.child
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().destroyed.push(self.id);
    }
}

/// Hands out fake markers with unique node numbers.
pub struct FakeFactory {
    next_node: Rc<Cell<u32>>,
    pub log: Rc<RefCell<MarkerLog>>,
    fail_creates: bool,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self { next_node: Rc::new(Cell::new(1)), log: Rc::new(RefCell::new(MarkerLog::default())), fail_creates: false }
    }

    /// A factory that shares node numbering and the log with `self`.
    pub fn sibling(&self) -> Self {
        Self { next_node: Rc::clone(&self.next_node), log: Rc::clone(&self.log), fail_creates: false }
    }

    /// A factory whose every creation fails.
    pub fn failing() -> Self {
        Self { fail_creates: true, ..Self::new() }
    }

    fn allocate(&self) -> u32 {
        let node = self.next_node.get();
        self.next_node.set(node + 1);
        node
    }
}

impl MarkerFactory for FakeFactory {
    type Marker = FakeMarker;

    fn create_marker(&mut self, annotation: &Annotation) -> Result<FakeMarker, MarkerError> {
        if self.fail_creates {
            return Err(MarkerError::Create("factory offline".into()));
        }
        self.log.borrow_mut().created.push(annotation.id);
        Ok(FakeMarker {
            id: annotation.id,
            root: self.allocate(),
            child: self.allocate(),
            shown: None,
            dragging: false,
            log: Rc::clone(&self.log),
        })
    }
}

/// Counts register / unregister calls.
#[derive(Clone, Default)]
pub struct CountingListeners {
    pub registered: Rc<Cell<u32>>,
    pub unregistered: Rc<Cell<u32>>,
}

impl CountingListeners {
    pub fn boxed(&self) -> Box<dyn ListenerHost> {
        Box::new(self.clone())
    }

    /// Registrations minus removals.
    pub fn live(&self) -> i64 {
        i64::from(self.registered.get()) - i64::from(self.unregistered.get())
    }
}

impl ListenerHost for CountingListeners {
    fn register(&mut self) {
        self.registered.set(self.registered.get() + 1);
    }

    fn unregister(&mut self) {
        self.unregistered.set(self.unregistered.get() + 1);
    }
}

/// A prompt that replays canned answers and records the messages it showed.
#[derive(Clone, Default)]
pub struct ScriptedPrompt {
    replies: Rc<RefCell<VecDeque<Option<String>>>>,
    pub asked: Rc<RefCell<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn replying(replies: &[Option<&str>]) -> Self {
        let queue = replies.iter().map(|r| r.map(str::to_owned)).collect();
        Self { replies: Rc::new(RefCell::new(queue)), asked: Rc::default() }
    }

    pub fn push(&self, reply: Option<&str>) {
        self.replies.borrow_mut().push_back(reply.map(str::to_owned));
    }

    pub fn times_asked(&self) -> usize {
        self.asked.borrow().len()
    }
}

impl TextPrompt for ScriptedPrompt {
    fn request_text(&mut self, message: &str) -> Option<String> {
        self.asked.borrow_mut().push(message.to_owned());
        self.replies.borrow_mut().pop_front().flatten()
    }
}
