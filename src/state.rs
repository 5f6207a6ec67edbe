//! Shared application state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! catalog is read-only, so no locking is needed.

use std::sync::Arc;

use crate::services::catalog::Catalog;

/// Shared application state. Clone is required by Axum; the catalog is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog: Arc::new(catalog) }
    }
}
