//! Annotation store: the authoritative annotation set and its page index.
//!
//! This module defines the [`Annotation`] record, the clamp policy that keeps
//! every stored position inside the percentage range, and [`AnnotationStore`],
//! which owns all live annotations. Every mutation goes through the store's
//! public operations and is announced to subscribers as a [`StoreChange`] so
//! page bindings can reconcile their markers without polling.
//!
//! Iteration order is insertion order. It carries no meaning beyond being
//! stable between calls.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{PERCENT_MAX, PERCENT_MIN};

/// Unique identifier for an annotation.
pub type AnnotationId = Uuid;

/// Handle returned by [`AnnotationStore::subscribe`].
pub type SubscriptionId = u64;

/// A user-placed text note anchored to a percentage position on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Unique identifier, assigned at creation and never reused.
    pub id: AnnotationId,
    /// Trimmed, non-empty note text.
    pub text: String,
    /// One-based number of the page this annotation sits on.
    pub page_number: u32,
    /// Horizontal position as a percentage of the page width.
    pub x: f64,
    /// Vertical position as a percentage of the page height.
    pub y: f64,
}

/// Project a coordinate into the valid percentage range. NaN maps to the lower bound.
#[must_use]
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return PERCENT_MIN;
    }
    value.clamp(PERCENT_MIN, PERCENT_MAX)
}

/// A mutation that has just been applied to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    /// A new annotation was appended.
    Created { id: AnnotationId, page_number: u32 },
    /// An existing annotation changed position.
    Moved { id: AnnotationId, page_number: u32 },
    /// An annotation was removed.
    Deleted { id: AnnotationId, page_number: u32 },
    /// The whole set was replaced; lists every page present before or after.
    Reloaded { page_numbers: Vec<u32> },
}

impl StoreChange {
    /// Whether the per-page view of `page_number` may differ after this change.
    #[must_use]
    pub fn touches_page(&self, page_number: u32) -> bool {
        match self {
            Self::Created { page_number: p, .. }
            | Self::Moved { page_number: p, .. }
            | Self::Deleted { page_number: p, .. } => *p == page_number,
            Self::Reloaded { page_numbers } => page_numbers.contains(&page_number),
        }
    }
}

type Listener = Box<dyn FnMut(&StoreChange)>;

/// In-memory store of annotations with a page-number index.
pub struct AnnotationStore {
    annotations: IndexMap<AnnotationId, Annotation>,
    by_page: BTreeMap<u32, IndexSet<AnnotationId>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
    version: u64,
}

impl AnnotationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            annotations: IndexMap::new(),
            by_page: BTreeMap::new(),
            listeners: Vec::new(),
            next_subscription: 1,
            version: 0,
        }
    }

    // --- Mutations ---

    /// Append a new annotation. Returns `None` (and changes nothing) when the
    /// trimmed text is empty or the page number is zero.
    pub fn create(&mut self, page_number: u32, x: f64, y: f64, text: &str) -> Option<Annotation> {
        let text = text.trim();
        if text.is_empty() {
            log::debug!("ignoring annotation with blank text on page {page_number}");
            return None;
        }
        if page_number == 0 {
            log::debug!("ignoring annotation for page 0");
            return None;
        }

        let annotation = Annotation {
            id: Uuid::new_v4(),
            text: text.to_owned(),
            page_number,
            x: clamp_percent(x),
            y: clamp_percent(y),
        };
        self.insert_indexed(annotation.clone());
        self.notify(&StoreChange::Created { id: annotation.id, page_number });
        Some(annotation)
    }

    /// Remove an annotation by id. Absent ids are ignored. Returns whether
    /// anything was removed.
    pub fn delete(&mut self, id: &AnnotationId) -> bool {
        let Some(removed) = self.annotations.shift_remove(id) else {
            log::debug!("delete of unknown annotation {id} ignored");
            return false;
        };
        if let Some(ids) = self.by_page.get_mut(&removed.page_number) {
            ids.shift_remove(id);
            if ids.is_empty() {
                self.by_page.remove(&removed.page_number);
            }
        }
        self.notify(&StoreChange::Deleted { id: *id, page_number: removed.page_number });
        true
    }

    /// Overwrite an annotation's position with clamped values. Absent ids are
    /// ignored. Returns whether the annotation exists.
    pub fn update_position(&mut self, id: &AnnotationId, x: f64, y: f64) -> bool {
        let Some(annotation) = self.annotations.get_mut(id) else {
            log::debug!("position update for unknown annotation {id} ignored");
            return false;
        };
        annotation.x = clamp_percent(x);
        annotation.y = clamp_percent(y);
        let page_number = annotation.page_number;
        self.notify(&StoreChange::Moved { id: *id, page_number });
        true
    }

    /// Replace all annotations with a saved set.
    ///
    /// Records are sanitized on the way in: positions are clamped, text is
    /// trimmed, and records with blank text, page 0, or an id already seen are
    /// dropped. Returns the number of annotations kept.
    pub fn load(&mut self, annotations: Vec<Annotation>) -> usize {
        let mut page_numbers: Vec<u32> = self.by_page.keys().copied().collect();
        self.annotations.clear();
        self.by_page.clear();

        for mut annotation in annotations {
            let trimmed = annotation.text.trim();
            if trimmed.is_empty() || annotation.page_number == 0 {
                log::debug!("dropping invalid saved annotation {}", annotation.id);
                continue;
            }
            if self.annotations.contains_key(&annotation.id) {
                log::debug!("dropping duplicate saved annotation {}", annotation.id);
                continue;
            }
            annotation.text = trimmed.to_owned();
            annotation.x = clamp_percent(annotation.x);
            annotation.y = clamp_percent(annotation.y);
            self.insert_indexed(annotation);
        }

        page_numbers.extend(self.by_page.keys().copied());
        page_numbers.sort_unstable();
        page_numbers.dedup();
        self.notify(&StoreChange::Reloaded { page_numbers });
        self.annotations.len()
    }

    // --- Queries ---

    /// Snapshot of every annotation in insertion order.
    #[must_use]
    pub fn list_all(&self) -> Vec<Annotation> {
        self.annotations.values().cloned().collect()
    }

    /// Snapshot of the annotations on one page in insertion order.
    #[must_use]
    pub fn list_for_page(&self, page_number: u32) -> Vec<Annotation> {
        self.by_page
            .get(&page_number)
            .map(|ids| ids.iter().filter_map(|id| self.annotations.get(id)).cloned().collect())
            .unwrap_or_default()
    }

    /// Look up an annotation by id.
    #[must_use]
    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &AnnotationId) -> bool {
        self.annotations.contains_key(id)
    }

    /// Page numbers that currently hold at least one annotation, ascending.
    #[must_use]
    pub fn page_numbers(&self) -> Vec<u32> {
        self.by_page.keys().copied().collect()
    }

    /// Number of annotations currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Returns `true` if the store contains no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Counter bumped once per applied mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    // --- Change notification ---

    /// Register a listener invoked synchronously after every mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreChange) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drop a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn insert_indexed(&mut self, annotation: Annotation) {
        self.by_page.entry(annotation.page_number).or_default().insert(annotation.id);
        self.annotations.insert(annotation.id, annotation);
    }

    fn notify(&mut self, change: &StoreChange) {
        self.version += 1;
        for (_, listener) in &mut self.listeners {
            listener(change);
        }
    }
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}
