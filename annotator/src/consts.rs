//! Shared numeric constants for the annotator crate.

// ── Coordinates ─────────────────────────────────────────────────

/// Lower bound of the percentage coordinate space.
pub const PERCENT_MIN: f64 = 0.0;

/// Upper bound of the percentage coordinate space.
pub const PERCENT_MAX: f64 = 100.0;

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest allowed zoom, in percent.
pub const ZOOM_MIN: u32 = 50;

/// Largest allowed zoom, in percent.
pub const ZOOM_MAX: u32 = 200;

/// Increment applied by a single zoom-in / zoom-out step, in percent.
pub const ZOOM_STEP: u32 = 25;

/// Zoom a freshly opened document starts at, in percent.
pub const ZOOM_DEFAULT: u32 = 100;

// ── Interaction ─────────────────────────────────────────────────

/// Message shown by the text prompt when placing a new annotation.
pub const ANNOTATION_PROMPT: &str = "Enter annotation text:";

/// Key name (as reported by the browser) that cancels an active drag.
pub const CANCEL_KEY: &str = "Escape";
