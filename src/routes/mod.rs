//! Router assembly.
//!
//! JSON catalog endpoints live under `/api`, page images and the raw catalog
//! files are served statically under `/mock`, and `/healthz` answers probes.

pub mod documents;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let mock = ServeDir::new(state.catalog.root());

    Router::new()
        .route("/api/documents", get(documents::list_documents))
        .route("/api/documents/{id}", get(documents::get_document))
        .route("/healthz", get(healthz))
        .nest_service("/mock", mock)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
