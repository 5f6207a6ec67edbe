#![allow(clippy::float_cmp)]

use std::rc::Rc;

use uuid::Uuid;

use super::*;
use crate::coords::Rect;
use crate::doc::Page;
use crate::test_helpers::{CountingListeners, FakeFactory, FakeSurface, ScriptedPrompt, page_rect};

fn two_page_document() -> Document {
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

struct Fixture {
    view: DocumentView<FakeFactory>,
    prompt: ScriptedPrompt,
    window: CountingListeners,
    clicks: CountingListeners,
    factory: FakeFactory,
    surfaces: Vec<Rc<FakeSurface>>,
}

/// A view over `document` with both pages mounted; page 2 sits below page 1.
fn mounted(document: Document) -> Fixture {
    let prompt = ScriptedPrompt::default();
    let mut view = DocumentView::new(document, Box::new(prompt.clone()));
    let window = CountingListeners::default();
    view.set_window_listeners(window.boxed());

    let clicks = CountingListeners::default();
    let factory = FakeFactory::new();
    let mut surfaces = Vec::new();
    for (page, top) in [(1, 0.0), (2, 1200.0)] {
        let surface = FakeSurface::new(Rect::new(0.0, top, 800.0, 1200.0));
        view.mount_page(page, surface.clone(), factory.sibling(), clicks.boxed()).unwrap();
        surfaces.push(surface);
    }
    Fixture { view, prompt, window, clicks, factory, surfaces }
}

fn click_at(x: f64, y: f64) -> PageClick<u32> {
    PageClick::at(Point::new(x, y))
}

// =============================================================
// Opening
// =============================================================

#[test]
fn new_view_loads_saved_annotations() {
    let mut document = two_page_document();
    let id = Uuid::new_v4();
    document.annotations = vec![
        Annotation { id, text: " kept ".into(), page_number: 1, x: 150.0, y: 20.0 },
        Annotation { id: Uuid::new_v4(), text: "  ".into(), page_number: 1, x: 0.0, y: 0.0 },
    ];
    let view: DocumentView<FakeFactory> = DocumentView::new(document, Box::new(ScriptedPrompt::default()));

    let all = view.annotations();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].text, "kept");
    assert_eq!(all[0].x, 100.0);
    assert!(view.document().annotations.is_empty());
    assert_eq!(view.zoom(), Zoom::default());
}

#[test]
fn mount_draws_existing_annotations() {
    let mut document = two_page_document();
    let id = Uuid::new_v4();
    document.annotations = vec![Annotation { id, text: "saved".into(), page_number: 2, x: 5.0, y: 5.0 }];
    let fx = mounted(document);

    assert!(fx.view.page(2).unwrap().has_marker(&id));
    assert_eq!(fx.view.page(1).unwrap().marker_count(), 0);
    assert_eq!(fx.factory.log.borrow().created, vec![id]);
}

#[test]
fn mount_rejects_unknown_page() {
    let mut view: DocumentView<FakeFactory> =
        DocumentView::new(two_page_document(), Box::new(ScriptedPrompt::default()));
    let err = view
        .mount_page(9, FakeSurface::new(page_rect()), FakeFactory::new(), CountingListeners::default().boxed())
        .unwrap_err();
    assert_eq!(err, ViewError::UnknownPage(9));
    assert!(view.mounted_pages().is_empty());
}

#[test]
fn window_listeners_register_once_for_many_pages() {
    let fx = mounted(two_page_document());
    assert_eq!(fx.window.registered.get(), 1);
    assert_eq!(fx.clicks.registered.get(), 2);
    assert_eq!(fx.view.mounted_pages(), vec![1, 2]);
}

#[test]
fn remount_replaces_the_old_binding() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    let a = fx.view.on_page_click(1, &click_at(400.0, 600.0)).unwrap();

    let report = fx
        .view
        .mount_page(1, FakeSurface::new(page_rect()), fx.factory.sibling(), fx.clicks.boxed())
        .unwrap();
    assert_eq!(report.created, vec![a.id]);
    assert_eq!(fx.clicks.registered.get(), 3);
    assert_eq!(fx.clicks.unregistered.get(), 1);
    assert_eq!(fx.window.registered.get(), 1);
}

// =============================================================
// Clicks
// =============================================================

#[test]
fn click_creates_annotation_on_clicked_page_and_draws_it() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("Test annotation"));

    let created = fx.view.on_page_click(2, &click_at(400.0, 1800.0)).unwrap();
    assert_eq!(created.page_number, 2);
    assert_eq!((created.x, created.y), (50.0, 50.0));
    assert!(fx.view.page(2).unwrap().has_marker(&created.id));
    assert!(!fx.view.page(1).unwrap().has_marker(&created.id));
}

#[test]
fn click_on_unmounted_page_does_nothing() {
    let mut fx = mounted(two_page_document());
    fx.view.unmount_page(2);
    fx.prompt.push(Some("x"));
    assert!(fx.view.on_page_click(2, &click_at(1.0, 1.0)).is_none());
    assert_eq!(fx.prompt.times_asked(), 0);
}

#[test]
fn cancelled_prompt_leaves_store_untouched() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(None);
    assert!(fx.view.on_page_click(1, &click_at(10.0, 10.0)).is_none());
    assert!(fx.view.annotations().is_empty());
}

#[test]
fn listings_never_cross_pages() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("one"));
    fx.prompt.push(Some("two"));
    let a = fx.view.on_page_click(1, &click_at(100.0, 100.0)).unwrap();
    let b = fx.view.on_page_click(2, &click_at(100.0, 1300.0)).unwrap();

    let page1: Vec<_> = fx.view.annotations_for_page(1).into_iter().map(|x| x.id).collect();
    let page2: Vec<_> = fx.view.annotations_for_page(2).into_iter().map(|x| x.id).collect();
    assert_eq!(page1, vec![a.id]);
    assert_eq!(page2, vec![b.id]);
    assert_eq!(fx.view.annotations().len(), 2);
}

// =============================================================
// Dragging
// =============================================================

#[test]
fn drag_moves_marker_and_highlights_it() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    let a = fx.view.on_page_click(1, &click_at(80.0, 120.0)).unwrap();

    fx.view.on_marker_drag_start(1, a.id).unwrap();
    assert!(fx.view.page(1).unwrap().marker(&a.id).unwrap().dragging);

    assert!(fx.view.on_pointer_move(Point::new(400.0, 600.0)));
    let shown = fx.view.page(1).unwrap().marker(&a.id).unwrap().shown.clone().unwrap();
    assert_eq!((shown.x, shown.y), (50.0, 50.0));

    assert_eq!(fx.view.on_pointer_up(), Some(a.id));
    assert!(!fx.view.page(1).unwrap().marker(&a.id).unwrap().dragging);
    assert!(!fx.view.on_pointer_move(Point::new(0.0, 0.0)));
}

#[test]
fn drag_is_measured_against_the_marker_page() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("b"));
    let b = fx.view.on_page_click(2, &click_at(400.0, 1800.0)).unwrap();

    fx.view.on_marker_drag_start(2, b.id).unwrap();
    fx.view.on_pointer_move(Point::new(400.0, 1500.0));
    let moved = fx.view.store().get(&b.id).unwrap();
    assert_eq!((moved.x, moved.y), (50.0, 25.0));
    assert_eq!(fx.surfaces[0].reads(), 0);
}

#[test]
fn highlight_is_recomputed_on_every_page() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    fx.prompt.push(Some("b"));
    let a = fx.view.on_page_click(1, &click_at(100.0, 100.0)).unwrap();
    let b = fx.view.on_page_click(2, &click_at(100.0, 1300.0)).unwrap();

    fx.view.on_marker_drag_start(1, a.id).unwrap();
    assert!(!fx.view.page(2).unwrap().marker(&b.id).unwrap().dragging);
    let updates_on_b = fx.factory.log.borrow().updates.iter().filter(|(id, _)| *id == b.id).count();
    assert!(updates_on_b >= 2);
}

#[test]
fn second_drag_is_rejected() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    fx.prompt.push(Some("b"));
    let a = fx.view.on_page_click(1, &click_at(100.0, 100.0)).unwrap();
    let b = fx.view.on_page_click(1, &click_at(200.0, 200.0)).unwrap();

    fx.view.on_marker_drag_start(1, a.id).unwrap();
    assert_eq!(
        fx.view.on_marker_drag_start(1, b.id),
        Err(ViewError::Drag(DragError::AlreadyDragging { active: a.id }))
    );
    assert_eq!(fx.view.drag().active_id(), Some(a.id));
}

#[test]
fn drag_start_on_unmounted_page_fails() {
    let mut fx = mounted(two_page_document());
    fx.view.unmount_page(1);
    assert_eq!(fx.view.on_marker_drag_start(1, Uuid::new_v4()), Err(ViewError::PageNotMounted(1)));
}

#[test]
fn drag_start_through_another_page_is_refused() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("b"));
    let b = fx.view.on_page_click(2, &click_at(400.0, 1800.0)).unwrap();

    assert_eq!(fx.view.on_marker_drag_start(1, b.id), Err(ViewError::NotOnPage { id: b.id, page: 1 }));
    assert!(!fx.view.drag().is_dragging());

    fx.view.on_marker_drag_start(2, b.id).unwrap();
    fx.view.on_pointer_move(Point::new(400.0, 1800.0));
    let moved = fx.view.store().get(&b.id).unwrap();
    assert_eq!((moved.x, moved.y), (50.0, 50.0));
}

#[test]
fn click_while_dragging_is_ignored() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    let a = fx.view.on_page_click(1, &click_at(100.0, 100.0)).unwrap();
    fx.view.on_marker_drag_start(1, a.id).unwrap();

    fx.prompt.push(Some("b"));
    assert!(fx.view.on_page_click(2, &click_at(100.0, 1300.0)).is_none());
    assert_eq!(fx.view.annotations().len(), 1);
}

#[test]
fn escape_cancels_drag_and_restores_position() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    let a = fx.view.on_page_click(1, &click_at(400.0, 600.0)).unwrap();
    fx.view.on_marker_drag_start(1, a.id).unwrap();
    fx.view.on_pointer_move(Point::new(0.0, 0.0));

    assert_eq!(fx.view.on_key_down(&Key("Enter".into())), None);
    assert!(fx.view.drag().is_dragging());

    assert_eq!(fx.view.on_key_down(&Key(CANCEL_KEY.into())), Some(a.id));
    let restored = fx.view.page(1).unwrap().marker(&a.id).unwrap().shown.clone().unwrap();
    assert_eq!((restored.x, restored.y), (50.0, 50.0));
    assert!(!fx.view.page(1).unwrap().marker(&a.id).unwrap().dragging);
}

// =============================================================
// Deleting
// =============================================================

#[test]
fn delete_removes_marker() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    let a = fx.view.on_page_click(1, &click_at(100.0, 100.0)).unwrap();

    assert!(fx.view.on_marker_delete(1, a.id));
    assert!(!fx.view.page(1).unwrap().has_marker(&a.id));
    assert_eq!(fx.factory.log.borrow().destroyed, vec![a.id]);
    assert!(!fx.view.on_marker_delete(1, a.id));
}

#[test]
fn deleting_the_dragged_annotation_ends_the_drag() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    let a = fx.view.on_page_click(1, &click_at(100.0, 100.0)).unwrap();
    fx.view.on_marker_drag_start(1, a.id).unwrap();

    assert!(fx.view.on_marker_delete(1, a.id));
    assert!(!fx.view.drag().is_dragging());
    assert!(!fx.view.on_pointer_move(Point::new(10.0, 10.0)));
    assert!(fx.view.annotations().is_empty());
}

#[test]
fn delete_through_another_page_does_nothing() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("b"));
    let b = fx.view.on_page_click(2, &click_at(100.0, 1300.0)).unwrap();

    assert!(!fx.view.on_marker_delete(1, b.id));
    assert!(fx.view.store().get(&b.id).is_some());
    assert!(fx.view.page(2).unwrap().has_marker(&b.id));
}

// =============================================================
// Zoom / save
// =============================================================

#[test]
fn zoom_steps_through_view() {
    let mut fx = mounted(two_page_document());
    assert_eq!(fx.view.zoom_in().label(), "125%");
    assert_eq!(fx.view.zoom_out().label(), "100%");
    assert_eq!(fx.view.zoom().percent(), 100);
}

#[test]
fn annotations_survive_zoom_relayout() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    let a = fx.view.on_page_click(1, &click_at(400.0, 600.0)).unwrap();
    fx.view.zoom_in();
    fx.surfaces[0].set_rect(Rect::new(0.0, 0.0, 1000.0, 1500.0));

    fx.view.on_marker_drag_start(1, a.id).unwrap();
    fx.view.on_pointer_move(Point::new(500.0, 750.0));
    let moved = fx.view.store().get(&a.id).unwrap();
    assert_eq!((moved.x, moved.y), (50.0, 50.0));
}

#[test]
fn save_attaches_annotations_to_document() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    fx.prompt.push(Some("b"));
    let a = fx.view.on_page_click(1, &click_at(100.0, 100.0)).unwrap();
    let b = fx.view.on_page_click(2, &click_at(100.0, 1300.0)).unwrap();

    let saved = fx.view.save();
    assert_eq!(saved.id, "1");
    assert_eq!(saved.pages.len(), 2);
    assert_eq!(saved.annotations, vec![a, b]);
    assert!(fx.view.document().annotations.is_empty());
}

#[test]
fn saved_document_reopens_with_same_annotations() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    fx.view.on_page_click(1, &click_at(100.0, 100.0)).unwrap();
    let saved = fx.view.save();

    let reopened: DocumentView<FakeFactory> = DocumentView::new(saved.clone(), Box::new(ScriptedPrompt::default()));
    assert_eq!(reopened.annotations(), saved.annotations);
}

// =============================================================
// Teardown
// =============================================================

#[test]
fn close_tears_everything_down_once() {
    let mut fx = mounted(two_page_document());
    fx.prompt.push(Some("a"));
    fx.view.on_page_click(1, &click_at(100.0, 100.0)).unwrap();

    fx.view.close();
    fx.view.close();
    assert!(fx.view.is_closed());
    assert!(fx.view.mounted_pages().is_empty());
    assert_eq!(fx.window.live(), 0);
    assert_eq!(fx.window.unregistered.get(), 1);
    assert_eq!(fx.clicks.live(), 0);
    assert_eq!(fx.factory.log.borrow().destroyed.len(), 1);
    assert_eq!(fx.view.store().subscriber_count(), 0);
}

#[test]
fn closed_view_refuses_mounts_and_events() {
    let mut fx = mounted(two_page_document());
    fx.view.close();

    let err = fx
        .view
        .mount_page(1, FakeSurface::new(page_rect()), fx.factory.sibling(), fx.clicks.boxed())
        .unwrap_err();
    assert_eq!(err, ViewError::Closed);
    assert_eq!(fx.window.registered.get(), 1);
    assert!(fx.view.mounted_pages().is_empty());

    fx.prompt.push(Some("after close"));
    assert!(fx.view.on_page_click(1, &click_at(400.0, 600.0)).is_none());
    assert_eq!(fx.prompt.times_asked(), 0);
    assert!(fx.view.annotations().is_empty());
    assert_eq!(fx.view.on_marker_drag_start(1, Uuid::new_v4()), Err(ViewError::Closed));
    assert!(!fx.view.on_pointer_move(Point::new(1.0, 1.0)));
}

#[test]
fn drop_closes_the_view() {
    let fx = mounted(two_page_document());
    let window = fx.window.clone();
    let clicks = fx.clicks.clone();
    drop(fx);
    assert_eq!(window.live(), 0);
    assert_eq!(clicks.live(), 0);
}

#[test]
fn replacing_window_listeners_moves_registration() {
    let mut fx = mounted(two_page_document());
    let replacement = CountingListeners::default();
    fx.view.set_window_listeners(replacement.boxed());
    assert_eq!(fx.window.live(), 0);
    assert_eq!(replacement.live(), 1);
}
