//! Document model: the wire types exchanged with the document catalog.
//!
//! A [`Document`] is what the viewer opens: an id, a display name, and an
//! ordered list of page images. When the user saves, the current annotation
//! set is attached to the document before it is handed back to the host.
//! [`DocumentList`] is the lighter listing shape served by the catalog.
//!
//! Field names are camelCase on the wire (`imageUrl`, `pageNumber`).

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};

use crate::store::Annotation;

/// One rendered page of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// One-based page number.
    pub number: u32,
    /// URL of the page image.
    pub image_url: String,
}

/// Id and name of a document, as shown in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
}

/// Response body of the document listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentList {
    pub documents: Vec<DocumentSummary>,
}

/// A complete document, optionally carrying saved annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub pages: Vec<Page>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Document {
    /// The listing entry for this document.
    #[must_use]
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary { id: self.id.clone(), name: self.name.clone() }
    }

    /// Look up a page by its number.
    #[must_use]
    pub fn page(&self, number: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == number)
    }

    #[must_use]
    pub fn has_page(&self, number: u32) -> bool {
        self.page(number).is_some()
    }
}
