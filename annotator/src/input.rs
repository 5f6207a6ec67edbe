//! Input model: host events and the capabilities the engine calls back into.
//!
//! The host translates DOM events into these types before handing them to the
//! [`crate::view::DocumentView`]. `PageClick` carries the click position and
//! whatever the host uses to identify the clicked node, so page bindings can
//! hit-test it against their markers. `TextPrompt` and `ListenerHost` are the
//! two side-effecting capabilities the engine needs from its environment; the
//! browser implementations live in [`crate::dom`].

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::coords::Point;

/// A click on a page element.
#[derive(Debug, Clone, PartialEq)]
pub struct PageClick<T> {
    /// Pointer position in viewport pixels.
    pub client: Point,
    /// The node the click landed on, if the host could resolve one.
    pub target: Option<T>,
}

impl<T> PageClick<T> {
    #[must_use]
    pub fn new(client: Point, target: Option<T>) -> Self {
        Self { client, target }
    }

    /// A click on bare page surface with no resolvable target.
    #[must_use]
    pub fn at(client: Point) -> Self {
        Self { client, target: None }
    }
}

/// What a marker's own controls asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAction {
    /// Pointer went down on the marker's drag handle.
    DragStart,
    /// The marker's delete control was activated.
    Delete,
}

impl MarkerAction {
    /// Parse the action name used in marker markup.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "drag" => Some(Self::DragStart),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Name used in marker markup.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DragStart => "drag",
            Self::Delete => "delete",
        }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Blocking source of annotation text.
///
/// Returns `None` when the user cancels. Cancellation and blank input are
/// treated the same by callers.
pub trait TextPrompt {
    fn request_text(&mut self, message: &str) -> Option<String>;
}

impl<F> TextPrompt for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn request_text(&mut self, message: &str) -> Option<String> {
        self(message)
    }
}

/// A set of event listeners that can be registered and removed as a unit.
///
/// Callers track whether the set is registered; implementations may assume
/// `register` and `unregister` alternate.
pub trait ListenerHost {
    fn register(&mut self);
    fn unregister(&mut self);
}

/// A listener host with nothing to register, for hosts that poll or wire
/// events themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoListeners;

impl ListenerHost for NoListeners {
    fn register(&mut self) {}

    fn unregister(&mut self) {}
}
