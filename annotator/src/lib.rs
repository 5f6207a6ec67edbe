//! Annotation engine for the document viewer.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! full lifecycle of page annotations: translating raw DOM pointer events into
//! percentage positions, holding the authoritative annotation set, tracking the
//! single active drag, and keeping the on-screen markers of every mounted page
//! in sync with that set. The host page is responsible only for rendering page
//! images and wiring DOM events to a [`view::DocumentView`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`view`] | Top-level [`view::DocumentView`] controller and save action |
//! | [`store`] | Annotation store, clamp policy, and change notification |
//! | [`coords`] | Points, bounding boxes, and pointer → percent mapping |
//! | [`drag`] | The exclusive drag session state machine |
//! | [`binding`] | Per-page marker reconciliation and click handling |
//! | [`input`] | Host-facing event types and capability traits |
//! | [`doc`] | Document model exchanged with the catalog server |
//! | [`zoom`] | Percent zoom level for the document view |
//! | [`dom`] | `web-sys` implementations of the host capabilities |
//! | [`consts`] | Shared numeric constants (percent range, zoom limits, etc.) |

pub mod binding;
pub mod consts;
pub mod coords;
pub mod doc;
pub mod dom;
pub mod drag;
pub mod input;
pub mod store;
pub mod view;
pub mod zoom;

#[cfg(test)]
pub(crate) mod test_helpers;
