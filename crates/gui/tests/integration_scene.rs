//! Integration tests for the preview scene lifecycle.
//!
//! Drives `TestHarness` through load, customization, font delivery and
//! disposal, checking what reaches the backend.

use customizer_gui_lib::fixtures::*;
use customizer_gui_lib::harness::{BackendCall, TestHarness};
use customizer_gui_lib::scene::backend::{MaterialHandle, MeshHandle};
use customizer_gui_lib::scene::SceneStatus;

/// Demo with the label font delivered: mesh 1, materials 2 and 3, text 4 and 5
fn demo_with_text() -> TestHarness {
    let mut h = TestHarness::new();
    h.open_demo();
    assert!(h.deliver_font(test_typeface()));
    h
}

#[test]
fn test_teardown_releases_in_reverse_order() {
    let mut h = demo_with_text();
    h.dispose();

    assert_eq!(
        h.backend().releases(),
        vec![
            BackendCall::ReleaseMaterial(MaterialHandle(5)),
            BackendCall::ReleaseMesh(MeshHandle(4)),
            BackendCall::ReleaseMaterial(MaterialHandle(3)),
            BackendCall::ReleaseMaterial(MaterialHandle(2)),
            BackendCall::ReleaseMesh(MeshHandle(1)),
            BackendCall::ReleaseSurface,
        ]
    );
    assert_eq!(h.backend().live_resources(), 0);
    assert_eq!(h.scene.status(), SceneStatus::Disposed);
}

#[test]
fn test_no_frames_after_dispose() {
    let mut h = demo_with_text();
    assert_eq!(h.advance(3), 3);
    let draws = h.backend().draw_count();

    h.dispose();
    assert_eq!(h.advance(5), 0);
    assert_eq!(h.backend().draw_count(), draws);
    assert!(!h.scene.is_running());
}

#[test]
fn test_dispose_twice_is_harmless() {
    let mut h = demo_with_text();
    h.dispose();
    h.dispose();
    assert_eq!(h.backend().releases().len(), 6);
}

#[test]
fn test_label_change_rebuilds_only_text() {
    let mut h = demo_with_text();
    h.scene.backend_mut().clear_calls();

    assert!(h.set("nameplate_label", "IO"));
    assert_eq!(
        h.backend().calls,
        vec![
            BackendCall::UpdateMaterial(MaterialHandle(2)),
            BackendCall::UpdateMaterial(MaterialHandle(3)),
            BackendCall::ReleaseMaterial(MaterialHandle(5)),
            BackendCall::ReleaseMesh(MeshHandle(4)),
            BackendCall::UploadMesh(MeshHandle(6)),
            BackendCall::CreateMaterial(MaterialHandle(7)),
        ]
    );
    assert_eq!(h.scene.text(), Some("IO"));
    assert_eq!(h.backend().mesh_count(), 2);
    assert!(h.backend().mesh(MeshHandle(1)).is_some());
}

#[test]
fn test_color_change_keeps_geometry() {
    let mut h = demo_with_text();
    h.scene.backend_mut().clear_calls();

    assert!(h.set("nameplate_background", "#ff0000"));
    assert_eq!(
        h.backend().calls,
        vec![
            BackendCall::UpdateMaterial(MaterialHandle(2)),
            BackendCall::UpdateMaterial(MaterialHandle(3)),
        ]
    );
    assert_eq!(h.scene.background_color(), Some([1.0, 0.0, 0.0]));
    assert_eq!(h.scene.text(), Some("BADGER"));
}

#[test]
fn test_unparsable_color_keeps_previous() {
    let mut h = demo_with_text();
    let before = h.scene.background_color();
    h.set("nameplate_background", "not a color");
    assert_eq!(h.scene.background_color(), before);
}

#[test]
fn test_label_edit_before_font_arrives() {
    let mut h = TestHarness::new();
    h.open_demo();
    h.set("nameplate_label", "OI");
    assert_eq!(h.scene.text(), None);

    assert!(h.deliver_font(test_typeface()));
    assert_eq!(h.scene.text(), Some("OI"));
}

#[test]
fn test_stale_font_is_discarded() {
    let mut h = TestHarness::new();
    h.open_demo();
    let stale = h.font_request().cloned().unwrap();

    h.open_text("plate.stl", &plate_stl(&["# TEMPLATE_TEXT_nameplate_label IO"]))
        .unwrap();
    let fresh = h.font_request().cloned().unwrap();
    assert_ne!(stale.scene_id, fresh.scene_id);

    let accepted = h.scene.deliver_font(customizer_gui_lib::font::FontResult {
        scene_id: stale.scene_id,
        result: Ok(test_typeface()),
    });
    assert!(!accepted);
    assert_eq!(h.scene.text(), None);
    assert_eq!(h.scene.scene_id(), Some(fresh.scene_id));
}

#[test]
fn test_font_for_disposed_scene_is_discarded() {
    let mut h = TestHarness::new();
    h.open_demo();
    h.dispose();
    assert!(!h.deliver_font(test_typeface()));
    assert_eq!(h.backend().live_resources(), 0);
}

#[test]
fn test_font_failure_leaves_model() {
    let mut h = TestHarness::new();
    h.open_demo();
    assert!(!h.fail_font(customizer_gui_lib::font::FontError::Network(
        "connection refused".into()
    )));
    assert!(h.scene.has_model());
    assert_eq!(h.scene.text(), None);
    assert_eq!(h.backend().mesh_count(), 1);
    assert_eq!(h.advance(1), 1);
}

#[test]
fn test_reload_releases_previous_scene() {
    let mut h = demo_with_text();
    h.open_text("plate.stl", &plate_stl(&[])).unwrap();

    // old scene fully released before the new surface is created
    let calls = &h.backend().calls;
    let release_surface = calls
        .iter()
        .position(|c| *c == BackendCall::ReleaseSurface)
        .unwrap();
    let second_create = calls
        .iter()
        .rposition(|c| matches!(c, BackendCall::CreateSurface(..)))
        .unwrap();
    assert!(release_surface < second_create);
    // surface + mesh + two materials
    assert_eq!(h.backend().live_resources(), 4);
    assert_eq!(h.scene.status(), SceneStatus::Ready);
}

#[test]
fn test_parse_failure_gives_empty_running_scene() {
    let mut h = TestHarness::new();
    h.open_text("empty.stl", "solid empty\nendsolid empty\n").unwrap();

    assert_eq!(h.scene.status(), SceneStatus::Ready);
    assert!(h.scene.is_running());
    assert!(!h.scene.has_model());
    assert!(h.font_request().is_some());
    assert_eq!(h.backend().live_resources(), 1);
    assert_eq!(h.advance(2), 2);
    assert!(h.backend().last_frame().unwrap().items.is_empty());
}

#[test]
fn test_non_finite_model_is_not_uploaded() {
    let mut h = TestHarness::new();
    let text = plate_stl(&[]).replacen("vertex 10 0 0", "vertex nan 0 0", 1);
    h.open_text("nan.stl", &text).unwrap();

    assert_eq!(h.scene.status(), SceneStatus::Ready);
    assert!(!h.scene.has_model());
    assert_eq!(h.backend().mesh_count(), 0);
    assert_eq!(h.backend().live_resources(), 1);
}

#[test]
fn test_binary_model_is_rendered() {
    let mut h = TestHarness::new();
    let text = binary_stl(&[
        [[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
        [[4.0, 0.0, 0.0], [4.0, 2.0, 0.0], [0.0, 2.0, 0.0]],
    ]);
    h.open_text("binary.stl", &text).unwrap();

    assert!(h.scene.has_model());
    let bounds = h.scene.model_bounds().unwrap();
    assert!((bounds.size().x - 4.0).abs() < 1e-5);
    // the loaded store holds the fallback nameplate fields
    assert_eq!(h.state.store.fields().len(), 3);
    assert_eq!(h.advance(1), 1);
    assert!(h.mesh_errors().is_empty(), "{:?}", h.mesh_errors());
}

#[test]
fn test_resize_updates_aspect() {
    let mut h = TestHarness::new();
    h.resize(800, 400);
    h.open_demo();
    assert_eq!(h.backend().surface(), Some((800, 400)));
    assert!((h.scene.camera().unwrap().aspect - 2.0).abs() < 1e-6);

    assert!(h.deliver_font(test_typeface()));
    assert_eq!(h.advance(1), 1);
    let items_before = h.backend().last_frame().unwrap().items.clone();
    let colors_before = (h.scene.background_color(), h.scene.frame_color());
    let meshes_before = h.backend().mesh_count();

    h.scene.backend_mut().clear_calls();
    h.resize(300, 600);
    assert_eq!(h.backend().calls, vec![BackendCall::SetViewportSize(300, 600)]);
    assert!((h.scene.camera().unwrap().aspect - 0.5).abs() < 1e-6);
    assert_eq!(h.backend().surface(), Some((300, 600)));

    // geometry, placement and materials are untouched
    assert_eq!(h.advance(1), 1);
    assert_eq!(h.backend().last_frame().unwrap().items, items_before);
    assert_eq!((h.scene.background_color(), h.scene.frame_color()), colors_before);
    assert_eq!(h.backend().mesh_count(), meshes_before);

    // zero-sized viewports are ignored
    h.scene.backend_mut().clear_calls();
    h.resize(0, 600);
    assert_eq!(h.scene.viewport(), (300, 600));
    assert!(h.backend().calls.is_empty());
}

#[test]
fn test_frames_draw_background_frame_then_text() {
    let mut h = demo_with_text();
    assert_eq!(h.advance(1), 1);
    let frame = h.backend().last_frame().unwrap();
    assert_eq!(frame.items.len(), 3);
    assert_eq!(frame.items[0].mesh, frame.items[1].mesh);
    assert_eq!(frame.items[2].mesh, MeshHandle(4));
    assert!(frame.items[2].render_order > frame.items[0].render_order);
}
