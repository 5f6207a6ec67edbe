//! Coordinate mapping from viewport pixels to page percentages.
//!
//! Pointer events arrive in viewport (client) pixels. Annotations are stored as
//! percentages of their page's bounding box so they survive zoom and layout
//! changes. [`to_percent`] is the only conversion between the two spaces and
//! always produces a value inside the clamp range, even for degenerate boxes.

#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;

use crate::consts::{PERCENT_MAX, PERCENT_MIN};
use crate::store::clamp_percent;

/// A point in either viewport-pixel or page-percent space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A bounding rectangle in viewport pixels, as reported by the page element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Whether both extents are finite and strictly positive.
    #[must_use]
    pub fn has_area(&self) -> bool {
        is_usable_extent(self.width) && is_usable_extent(self.height)
    }
}

/// Anything that can report the current bounding box of a rendered page.
///
/// The rectangle may change between calls (scrolling, zoom), so callers read
/// it fresh for every conversion and never cache it.
pub trait PageSurface {
    /// Current bounding rectangle in viewport pixels.
    fn bounding_rect(&self) -> Rect;
}

impl PageSurface for Rect {
    fn bounding_rect(&self) -> Rect {
        *self
    }
}

/// Convert a viewport-pixel pointer position into a clamped page percentage.
#[must_use]
pub fn to_percent(pointer: Point, rect: Rect) -> Point {
    Point {
        x: axis_percent(pointer.x, rect.left, rect.width),
        y: axis_percent(pointer.y, rect.top, rect.height),
    }
}

/// Map a pointer against the surface's bounding box as it is right now.
#[must_use]
pub fn surface_percent(pointer: Point, surface: &dyn PageSurface) -> Point {
    to_percent(pointer, surface.bounding_rect())
}

fn axis_percent(pointer: f64, origin: f64, extent: f64) -> f64 {
    let offset = pointer - origin;
    if !is_usable_extent(extent) {
        // Zero-size axis: anything past the origin is off the far edge.
        return if offset > 0.0 { PERCENT_MAX } else { PERCENT_MIN };
    }
    clamp_percent(offset / extent * 100.0)
}

fn is_usable_extent(extent: f64) -> bool {
    extent.is_finite() && extent > 0.0
}
