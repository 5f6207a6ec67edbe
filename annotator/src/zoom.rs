//! Zoom level of the document view, in whole percent.

#[cfg(test)]
#[path = "zoom_test.rs"]
mod zoom_test;

use crate::consts::{ZOOM_DEFAULT, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

/// Percent zoom, always within `ZOOM_MIN..=ZOOM_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom(u32);

impl Default for Zoom {
    fn default() -> Self {
        Self(ZOOM_DEFAULT)
    }
}

impl Zoom {
    /// A zoom of `percent`, clamped into range.
    #[must_use]
    pub fn new(percent: u32) -> Self {
        Self(percent.clamp(ZOOM_MIN, ZOOM_MAX))
    }

    #[must_use]
    pub fn percent(self) -> u32 {
        self.0
    }

    /// Multiplier for page dimensions (`150%` → `1.5`).
    #[must_use]
    pub fn scale(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Display label such as `"150%"`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{}%", self.0)
    }

    #[must_use]
    pub fn can_zoom_in(self) -> bool {
        self.0 < ZOOM_MAX
    }

    #[must_use]
    pub fn can_zoom_out(self) -> bool {
        self.0 > ZOOM_MIN
    }

    /// Step up, stopping at the maximum. Returns the new level.
    pub fn zoom_in(&mut self) -> Self {
        self.0 = (self.0 + ZOOM_STEP).min(ZOOM_MAX);
        *self
    }

    /// Step down, stopping at the minimum. Returns the new level.
    pub fn zoom_out(&mut self) -> Self {
        self.0 = self.0.saturating_sub(ZOOM_STEP).max(ZOOM_MIN);
        *self
    }
}
