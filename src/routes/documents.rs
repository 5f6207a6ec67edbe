//! Document catalog routes.

use annotator::doc::{Document, DocumentList};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use crate::services::catalog::CatalogError;
use crate::state::AppState;

/// `GET /api/documents`: list document ids and names.
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<DocumentList>, StatusCode> {
    let list = state
        .catalog
        .list()
        .await
        .inspect_err(|e| tracing::error!(error = %e, code = e.error_code(), "document listing failed"))
        .map_err(catalog_error_to_status)?;
    Ok(Json(list))
}

/// `GET /api/documents/{id}`: one document with its pages.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, StatusCode> {
    let document = state
        .catalog
        .get(&id)
        .await
        .inspect_err(|e| tracing::warn!(%id, error = %e, code = e.error_code(), "document lookup failed"))
        .map_err(catalog_error_to_status)?;
    Ok(Json(document))
}

pub(crate) fn catalog_error_to_status(err: CatalogError) -> StatusCode {
    match err {
        CatalogError::MissingId | CatalogError::InvalidId(_) => StatusCode::BAD_REQUEST,
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Io { .. } | CatalogError::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "documents_test.rs"]
mod tests;
