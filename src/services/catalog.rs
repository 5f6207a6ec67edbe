//! Document catalog backed by a directory of JSON files.
//!
//! Layout of the catalog root:
//!
//! ```text
//! documents.json        # { "documents": [{ "id", "name" }] }
//! documents/{id}.json   # { "id", "name", "pages": [{ "number", "imageUrl" }] }
//! pages/...             # page images, served statically under /mock
//! ```
//!
//! Files are read on every request so edits show up without a restart.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use annotator::doc::{Document, DocumentList};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("document id is required")]
    MissingId,
    #[error("invalid document id: {0:?}")]
    InvalidId(String),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// Grepable code for structured logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingId => "E_MISSING_ID",
            Self::InvalidId(_) => "E_INVALID_ID",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Io { .. } => "E_IO",
            Self::Parse { .. } => "E_PARSE",
        }
    }
}

/// Read-only view of a catalog directory.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

// =============================================================================
// CATALOG
// =============================================================================

impl Catalog {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All documents, in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] or [`CatalogError::Parse`] if the listing
    /// file is missing or malformed.
    pub async fn list(&self) -> Result<DocumentList, CatalogError> {
        read_json(&self.root.join("documents.json")).await
    }

    /// One document by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingId`] or [`CatalogError::InvalidId`] for a
    /// bad id, [`CatalogError::NotFound`] if no such file exists, and
    /// [`CatalogError::Io`] / [`CatalogError::Parse`] for unreadable files.
    pub async fn get(&self, id: &str) -> Result<Document, CatalogError> {
        let id = validate_id(id)?;
        let path = self.root.join("documents").join(format!("{id}.json"));
        let document: Document = match read_json(&path).await {
            Err(CatalogError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::NotFound(id.to_string()));
            }
            other => other?,
        };
        if document.id != id {
            warn!(requested = %id, found = %document.id, "document id does not match its file name");
        }
        debug!(%id, pages = document.pages.len(), "document loaded");
        Ok(document)
    }
}

/// Accept ids made of ASCII letters, digits, `-` and `_`. Surrounding
/// whitespace is trimmed.
///
/// # Errors
///
/// Returns [`CatalogError::MissingId`] for a blank id and
/// [`CatalogError::InvalidId`] for anything that could escape the catalog.
pub fn validate_id(id: &str) -> Result<&str, CatalogError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CatalogError::MissingId);
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(CatalogError::InvalidId(id.to_string()));
    }
    Ok(id)
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_slice(&bytes).map_err(|source| CatalogError::Parse { path: path.to_path_buf(), source })
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
