use serde_json::json;
use uuid::Uuid;

use super::*;

fn sample() -> Document {
    Document {
        id: "1".into(),
        name: "Test Document".into(),
        pages: vec![
            Page { number: 1, image_url: "mock/pages/1-1.png".into() },
            Page { number: 2, image_url: "mock/pages/1-2.png".into() },
        ],
        annotations: Vec::new(),
    }
}

// =============================================================
// Wire format
// =============================================================

#[test]
fn document_parses_catalog_json() {
    let doc: Document = serde_json::from_value(json!({
        "id": "1",
        "name": "Test Document",
        "pages": [
            { "number": 1, "imageUrl": "mock/pages/1-1.png" },
            { "number": 2, "imageUrl": "mock/pages/1-2.png" }
        ]
    }))
    .unwrap();
    assert_eq!(doc, sample());
}

#[test]
fn document_without_annotations_omits_the_field() {
    let value = serde_json::to_value(sample()).unwrap();
    assert!(value.get("annotations").is_none());
    assert_eq!(value["pages"][0]["imageUrl"], "mock/pages/1-1.png");
}

#[test]
fn saved_annotations_use_camel_case() {
    let mut doc = sample();
    let id = Uuid::new_v4();
    doc.annotations.push(Annotation { id, text: "note".into(), page_number: 2, x: 10.0, y: 20.0 });

    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value["annotations"][0]["pageNumber"], 2);
    assert_eq!(value["annotations"][0]["id"], id.to_string());

    let back: Document = serde_json::from_value(value).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn document_list_parses() {
    let list: DocumentList = serde_json::from_value(json!({
        "documents": [{ "id": "1", "name": "Test Document" }]
    }))
    .unwrap();
    assert_eq!(list.documents, vec![sample().summary()]);
}

// =============================================================
// Helpers
// =============================================================

#[test]
fn page_lookup_by_number() {
    let doc = sample();
    assert_eq!(doc.page(2).map(|p| p.image_url.as_str()), Some("mock/pages/1-2.png"));
    assert!(doc.page(3).is_none());
    assert!(doc.has_page(1));
    assert!(!doc.has_page(0));
}
