//! Headless test harness.
//!
//! Drives the same state, sync and scene code as the application with a
//! [`RecordingBackend`] in place of the GL backend, so scene lifecycles can
//! be checked without a window.

use std::collections::HashMap;

use stl_template::{ExportArtifact, TemplateError};

use crate::font::{FontError, FontRequest, FontResult, Typeface};
use crate::scene::backend::{FrameSnapshot, Material, MaterialHandle, MeshHandle, RenderBackend};
use crate::scene::sync::SceneSync;
use crate::scene::{SceneConfig, SceneManager};
use crate::state::{AppSettings, AppState};
use crate::validation::preview_mesh_issues;
use crate::viewport::mesh::MeshData;

/// One call received by a [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateSurface(u32, u32),
    ReleaseSurface,
    SetViewportSize(u32, u32),
    UploadMesh(MeshHandle),
    ReleaseMesh(MeshHandle),
    CreateMaterial(MaterialHandle),
    UpdateMaterial(MaterialHandle),
    ReleaseMaterial(MaterialHandle),
    Draw,
}

/// Backend that keeps CPU copies of everything and logs each call
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<BackendCall>,
    meshes: HashMap<MeshHandle, MeshData>,
    materials: HashMap<MaterialHandle, Material>,
    surface: Option<(u32, u32)>,
    draws: u64,
    last_frame: Option<FrameSnapshot>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.meshes.get(&handle)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(&handle)
    }

    pub fn surface(&self) -> Option<(u32, u32)> {
        self.surface
    }

    /// Meshes, materials and the surface still alive
    pub fn live_resources(&self) -> usize {
        self.meshes.len() + self.materials.len() + usize::from(self.surface.is_some())
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn last_frame(&self) -> Option<&FrameSnapshot> {
        self.last_frame.as_ref()
    }

    /// Release calls in the order they arrived
    pub fn releases(&self) -> Vec<BackendCall> {
        self.calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    BackendCall::ReleaseSurface
                        | BackendCall::ReleaseMesh(_)
                        | BackendCall::ReleaseMaterial(_)
                )
            })
            .cloned()
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn create_surface(&mut self, width: u32, height: u32) {
        debug_assert!(self.surface.is_none(), "surface created twice");
        self.surface = Some((width, height));
        self.calls.push(BackendCall::CreateSurface(width, height));
    }

    fn release_surface(&mut self) {
        self.surface = None;
        self.calls.push(BackendCall::ReleaseSurface);
    }

    fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.surface = Some((width, height));
        self.calls.push(BackendCall::SetViewportSize(width, height));
    }

    fn upload_mesh(&mut self, handle: MeshHandle, mesh: &MeshData) {
        self.meshes.insert(handle, mesh.clone());
        self.calls.push(BackendCall::UploadMesh(handle));
    }

    fn release_mesh(&mut self, handle: MeshHandle) {
        self.meshes.remove(&handle);
        self.calls.push(BackendCall::ReleaseMesh(handle));
    }

    fn create_material(&mut self, handle: MaterialHandle, material: &Material) {
        self.materials.insert(handle, *material);
        self.calls.push(BackendCall::CreateMaterial(handle));
    }

    fn update_material(&mut self, handle: MaterialHandle, material: &Material) {
        self.materials.insert(handle, *material);
        self.calls.push(BackendCall::UpdateMaterial(handle));
    }

    fn release_material(&mut self, handle: MaterialHandle) {
        self.materials.remove(&handle);
        self.calls.push(BackendCall::ReleaseMaterial(handle));
    }

    fn draw(&mut self, frame: &FrameSnapshot) {
        self.draws += 1;
        self.last_frame = Some(frame.clone());
        self.calls.push(BackendCall::Draw);
    }
}

/// Headless test harness: application state plus a recorded scene
pub struct TestHarness {
    pub state: AppState,
    pub scene: SceneManager<RecordingBackend>,
    sync: SceneSync,
    font_request: Option<FontRequest>,
}

impl TestHarness {
    /// Create a new empty harness.
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            state: AppState::new(AppSettings::default()),
            scene: SceneManager::new(RecordingBackend::new(), config),
            sync: SceneSync::new(),
            font_request: None,
        }
    }

    // ── Documents ─────────────────────────────────────────────

    /// Load the built-in demo and build its scene
    pub fn open_demo(&mut self) {
        self.state.open_demo();
        self.sync();
    }

    /// Load a model file and build its scene
    pub fn open_file(&mut self, name: &str, bytes: &[u8]) -> Result<(), TemplateError> {
        self.state.open_file(name, None, bytes)?;
        self.sync();
        Ok(())
    }

    /// Load model text (decoded one char per byte)
    pub fn open_text(&mut self, name: &str, text: &str) -> Result<(), TemplateError> {
        self.open_file(name, &stl_template::model_text::encode(text))
    }

    /// Edit a form value and push it to the scene
    pub fn set(&mut self, id: &str, value: &str) -> bool {
        let changed = self.state.set_value(id, value);
        self.sync();
        changed
    }

    pub fn export(&self) -> Option<ExportArtifact> {
        self.state.export()
    }

    /// Exported file as text
    pub fn export_text(&self) -> Option<String> {
        self.export()
            .map(|artifact| stl_template::model_text::decode(&artifact.bytes))
    }

    fn sync(&mut self) {
        if let Some(request) = self.sync.sync(&self.state, &mut self.scene) {
            self.font_request = Some(request);
        }
    }

    // ── Fonts ─────────────────────────────────────────────────

    /// Font request of the most recent load
    pub fn font_request(&self) -> Option<&FontRequest> {
        self.font_request.as_ref()
    }

    /// Answer the most recent font request with `typeface`
    pub fn deliver_font(&mut self, typeface: Typeface) -> bool {
        let Some(request) = self.font_request.clone() else {
            return false;
        };
        self.scene.deliver_font(FontResult {
            scene_id: request.scene_id,
            result: Ok(typeface),
        })
    }

    /// Answer the most recent font request with an error
    pub fn fail_font(&mut self, error: FontError) -> bool {
        let Some(request) = self.font_request.clone() else {
            return false;
        };
        self.scene.deliver_font(FontResult {
            scene_id: request.scene_id,
            result: Err(error),
        })
    }

    // ── Frames ────────────────────────────────────────────────

    /// Run up to `n` frames; returns how many were drawn
    pub fn advance(&mut self, n: usize) -> usize {
        (0..n).filter(|_| self.scene.advance_frame()).count()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.resize(width, height);
    }

    pub fn dispose(&mut self) {
        self.scene.dispose();
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn backend(&self) -> &RecordingBackend {
        self.scene.backend()
    }

    /// Draw items of the last frame, with their meshes
    pub fn drawn_meshes(&self) -> Vec<&MeshData> {
        let backend = self.backend();
        backend
            .last_frame()
            .map(|frame| {
                frame
                    .items
                    .iter()
                    .filter_map(|item| backend.mesh(item.mesh))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Issues of every drawn mesh; both model and text meshes are expected
    /// to be centered, non-degenerate and unit-normal
    pub fn mesh_errors(&self) -> Vec<String> {
        self.drawn_meshes()
            .into_iter()
            .flat_map(preview_mesh_issues)
            .map(|issue| issue.to_string())
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_typeface;

    #[test]
    fn test_new_harness_empty() {
        let h = TestHarness::new();
        assert!(h.state.document.is_none());
        assert_eq!(h.backend().live_resources(), 0);
        assert!(h.font_request().is_none());
    }

    #[test]
    fn test_open_demo_builds_scene() {
        let mut h = TestHarness::new();
        h.open_demo();
        assert!(h.scene.has_model());
        // surface + one geometry + two materials
        assert_eq!(h.backend().live_resources(), 4);
        assert_eq!(h.advance(1), 1);
        assert!(h.mesh_errors().is_empty(), "{:?}", h.mesh_errors());
    }

    #[test]
    fn test_deliver_font_adds_text() {
        let mut h = TestHarness::new();
        h.open_demo();
        h.state.set_value("nameplate_label", "IO");
        h.sync();
        assert!(h.deliver_font(test_typeface()));
        assert_eq!(h.scene.text(), Some("IO"));
        assert_eq!(h.backend().mesh_count(), 2);
    }

    #[test]
    fn test_recording_backend_releases() {
        let mut backend = RecordingBackend::new();
        backend.create_surface(10, 10);
        backend.upload_mesh(MeshHandle(1), &MeshData::new());
        backend.release_mesh(MeshHandle(1));
        backend.release_surface();
        assert_eq!(
            backend.releases(),
            vec![BackendCall::ReleaseMesh(MeshHandle(1)), BackendCall::ReleaseSurface]
        );
        assert_eq!(backend.live_resources(), 0);
    }
}
