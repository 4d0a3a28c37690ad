//! Live preview scene.
//!
//! [`SceneManager`] owns at most one [`RenderState`]: the meshes, materials,
//! camera, controls and render loop built for the currently loaded model.
//! Loading a new model tears the previous state down completely before the
//! next one is built, and every resource acquired while building is
//! released in reverse order on teardown.

pub mod backend;
pub mod ledger;
pub mod render_loop;
pub mod sync;

use egui::Color32;
use glam::{Mat4, Vec3};
use stl_template::CustomizationValues;
use uuid::Uuid;

use crate::color::{parse_color, to_rgb_f32};
use crate::font::{build_text_mesh, FontRequest, FontResult, TextStyle, Typeface};
use crate::geometry::parse_stl;
use crate::validation::{check_drawable, MeshIssue};
use crate::viewport::bounds::Aabb;
use crate::viewport::camera::PerspectiveCamera;
use crate::viewport::controls::{OrbitControls, DEFAULT_DAMPING};
use crate::viewport::mesh::MeshData;
use backend::{
    DrawItem, FrameSnapshot, Light, Material, MaterialHandle, MeshHandle, RenderBackend,
};
use ledger::{Resource, ResourceLedger};
use render_loop::RenderLoop;

/// Frame mesh scale relative to the background mesh
pub const FRAME_SCALE: Vec3 = Vec3::new(1.05, 1.05, 1.2);
/// Frame mesh offset behind the background mesh
pub const FRAME_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -0.2);
pub const TEXT_SCALE: f32 = 0.3;
/// Text sits in front of the background mesh
pub const TEXT_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 2.1);
pub const TEXT_POLYGON_OFFSET: (f32, f32) = (-1.0, -4.0);
pub const TEXT_RENDER_ORDER: i32 = 1;
/// Label used when no text field is set
pub const FALLBACK_TEXT: &str = "BADGER";

pub const DEFAULT_BACKGROUND_COLOR: Color32 = Color32::from_rgb(0xFF, 0xA5, 0x00);
pub const DEFAULT_FRAME_COLOR: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
pub const DEFAULT_CLEAR_COLOR: Color32 = Color32::from_rgb(0xF0, 0xF0, 0xF0);

/// Field ids read from the customization values, in priority order
const BACKGROUND_COLOR_KEYS: [&str; 2] = ["main_color", "nameplate_background"];
const FRAME_COLOR_KEYS: [&str; 2] = ["accent_color", "nameplate_frame"];
const TEXT_KEYS: [&str; 2] = ["custom_text", "nameplate_label"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneStatus {
    /// Nothing loaded yet
    Empty,
    Loading,
    Ready,
    /// Tearing down the previous state for a new load
    Reloading,
    Disposed,
}

/// Fixed settings of a scene manager
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub clear_color: Color32,
    pub fov_degrees: f32,
    pub damping: f32,
    pub text_style: TextStyle,
    pub font_setup_url: Option<String>,
    pub font_url: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear_color: DEFAULT_CLEAR_COLOR,
            fov_degrees: PerspectiveCamera::DEFAULT_FOV_DEGREES,
            damping: DEFAULT_DAMPING,
            text_style: TextStyle::default(),
            font_setup_url: Some("http://localhost:3001/api/setup".to_string()),
            font_url: "http://localhost:3001/fonts/helvetiker_regular.typeface.json".to_string(),
        }
    }
}

/// Background and frame meshes sharing one uploaded geometry
#[derive(Debug)]
struct ModelMeshes {
    mesh: MeshHandle,
    bounds: Aabb,
    background: MaterialHandle,
    background_material: Material,
    frame: MaterialHandle,
    frame_material: Material,
}

#[derive(Debug)]
struct TextMesh {
    mesh: MeshHandle,
    material: MaterialHandle,
    text: String,
    bounds: Aabb,
}

/// All live resources of one loaded model
#[derive(Debug)]
pub struct RenderState {
    id: Uuid,
    ledger: ResourceLedger,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    render_loop: RenderLoop,
    lights: Vec<Light>,
    model: Option<ModelMeshes>,
    typeface: Option<Typeface>,
    text: Option<TextMesh>,
    values: CustomizationValues,
}

impl RenderState {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

pub struct SceneManager<B: RenderBackend> {
    backend: B,
    config: SceneConfig,
    status: SceneStatus,
    state: Option<RenderState>,
    viewport: (u32, u32),
    next_handle: u64,
}

impl<B: RenderBackend> SceneManager<B> {
    pub fn new(backend: B, config: SceneConfig) -> Self {
        Self {
            backend,
            config,
            status: SceneStatus::Empty,
            state: None,
            viewport: (1, 1),
            next_handle: 1,
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Build a new render state for `stl_text`, releasing the previous one
    /// first. A model that fails to parse still yields a running, empty
    /// scene. Returns the font request for the text overlay, tagged with
    /// the new state's id.
    pub fn load(&mut self, stl_text: &str, values: &CustomizationValues) -> FontRequest {
        if self.state.is_some() {
            self.status = SceneStatus::Reloading;
            self.teardown();
        }
        self.status = SceneStatus::Loading;

        let (width, height) = self.viewport;
        let mut ledger = ResourceLedger::new();
        self.backend.create_surface(width, height);
        ledger.record(Resource::Surface);
        let controls = OrbitControls::new(self.config.damping);
        ledger.record(Resource::Controls);

        let mut state = RenderState {
            id: Uuid::new_v4(),
            ledger,
            camera: PerspectiveCamera::new(self.config.fov_degrees, width as f32 / height as f32),
            controls,
            render_loop: RenderLoop::new(),
            lights: scene_lights(),
            model: None,
            typeface: None,
            text: None,
            values: values.clone(),
        };

        match parse_stl(stl_text) {
            Ok(mesh) => {
                if let Some(model) = self.build_model(&mut state.ledger, mesh) {
                    state.camera.fit(&model.bounds);
                    tracing::info!(
                        scene_id = %state.id,
                        size = ?model.bounds.size(),
                        distance = state.camera.distance,
                        "Model loaded"
                    );
                    state.model = Some(model);
                }
            }
            Err(e) => tracing::error!(scene_id = %state.id, "Error loading STL: {e}"),
        }

        self.recolor(&mut state);
        state.render_loop.start();

        let request = FontRequest {
            scene_id: state.id,
            setup_url: self.config.font_setup_url.clone(),
            typeface_url: self.config.font_url.clone(),
        };
        self.state = Some(state);
        self.status = SceneStatus::Ready;
        request
    }

    /// Release everything; the manager stays usable for a later `load`
    pub fn dispose(&mut self) {
        if self.state.is_some() {
            self.teardown();
        }
        if self.status != SceneStatus::Empty {
            self.status = SceneStatus::Disposed;
        }
    }

    fn teardown(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };
        state.render_loop.stop();

        let resources = state.ledger.drain_lifo();
        tracing::info!(
            scene_id = %state.id,
            resources = resources.len(),
            frames = state.render_loop.frames(),
            "Disposing scene"
        );
        for resource in resources {
            match resource {
                Resource::Mesh(handle) => self.backend.release_mesh(handle),
                Resource::Material(handle) => self.backend.release_material(handle),
                Resource::Controls => state.controls.dispose(),
                Resource::Surface => self.backend.release_surface(),
            }
        }
    }

    /// Center the parsed mesh, upload it once and create the background and
    /// frame materials
    fn build_model(&mut self, ledger: &mut ResourceLedger, mut mesh: MeshData) -> Option<ModelMeshes> {
        if let Err(e) = check_drawable(&mesh) {
            tracing::error!("Model mesh cannot be drawn: {e}");
            return None;
        }
        let raw_bounds = Aabb::from_mesh(&mesh)?;
        mesh.translate(-raw_bounds.center());
        let bounds = raw_bounds.translated(-raw_bounds.center());

        let mesh_handle = MeshHandle(self.allocate_handle());
        self.backend.upload_mesh(mesh_handle, &mesh);
        ledger.record(Resource::Mesh(mesh_handle));

        let background_material = Material::solid(to_rgb_f32(DEFAULT_BACKGROUND_COLOR));
        let background = MaterialHandle(self.allocate_handle());
        self.backend.create_material(background, &background_material);
        ledger.record(Resource::Material(background));

        let frame_material = Material::solid(to_rgb_f32(DEFAULT_FRAME_COLOR));
        let frame = MaterialHandle(self.allocate_handle());
        self.backend.create_material(frame, &frame_material);
        ledger.record(Resource::Material(frame));

        Some(ModelMeshes {
            mesh: mesh_handle,
            bounds,
            background,
            background_material,
            frame,
            frame_material,
        })
    }

    fn allocate_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    // ── Customization ──────────────────────────────────────────

    /// Apply new customization values to the live scene. Colors update the
    /// materials in place; a changed label rebuilds only the text mesh.
    pub fn apply_customization(&mut self, values: &CustomizationValues) {
        let Some(mut state) = self.state.take() else {
            return;
        };
        state.values = values.clone();
        self.recolor(&mut state);
        self.sync_text(&mut state);
        self.state = Some(state);
    }

    fn recolor(&mut self, state: &mut RenderState) {
        let Some(model) = state.model.as_mut() else {
            return;
        };
        if let Some(color) = pick_color(&state.values, &BACKGROUND_COLOR_KEYS) {
            model.background_material.color = color;
            self.backend
                .update_material(model.background, &model.background_material);
        }
        if let Some(color) = pick_color(&state.values, &FRAME_COLOR_KEYS) {
            model.frame_material.color = color;
            self.backend.update_material(model.frame, &model.frame_material);
        }
    }

    // ── Text overlay ───────────────────────────────────────────

    /// Hand over a finished font fetch. Results for a state that is no
    /// longer active are discarded. Returns whether the font was accepted.
    pub fn deliver_font(&mut self, result: FontResult) -> bool {
        let Some(mut state) = self.state.take() else {
            tracing::debug!(scene_id = %result.scene_id, "Discarding font for disposed scene");
            return false;
        };
        if state.id != result.scene_id {
            tracing::debug!(
                scene_id = %result.scene_id,
                active = %state.id,
                "Discarding stale font result"
            );
            self.state = Some(state);
            return false;
        }

        let accepted = match result.result {
            Ok(typeface) => {
                state.typeface = Some(typeface);
                self.sync_text(&mut state);
                true
            }
            Err(e) => {
                tracing::warn!(scene_id = %state.id, "Text overlay unavailable: {e}");
                false
            }
        };
        self.state = Some(state);
        accepted
    }

    /// Rebuild the text mesh if the derived label changed
    fn sync_text(&mut self, state: &mut RenderState) {
        let Some(typeface) = state.typeface.as_ref() else {
            return;
        };
        let text = label_text(&state.values);
        if state.text.as_ref().is_some_and(|t| t.text == text) {
            return;
        }

        if let Some(old) = state.text.take() {
            state.ledger.forget(Resource::Material(old.material));
            self.backend.release_material(old.material);
            state.ledger.forget(Resource::Mesh(old.mesh));
            self.backend.release_mesh(old.mesh);
        }

        let mesh = build_text_mesh(typeface, &text, &self.config.text_style);
        match check_drawable(&mesh) {
            Ok(()) => {}
            Err(MeshIssue::Empty) => {
                tracing::debug!("Label '{text}' has no visible glyphs");
                return;
            }
            Err(e) => {
                tracing::warn!("Text mesh for '{text}' cannot be drawn: {e}");
                return;
            }
        }
        let Some(bounds) = Aabb::from_mesh(&mesh) else {
            return;
        };

        let mesh_handle = MeshHandle(self.allocate_handle());
        self.backend.upload_mesh(mesh_handle, &mesh);
        state.ledger.record(Resource::Mesh(mesh_handle));

        let material = MaterialHandle(self.allocate_handle());
        self.backend.create_material(
            material,
            &Material {
                color: [1.0, 1.0, 1.0],
                polygon_offset: Some(TEXT_POLYGON_OFFSET),
            },
        );
        state.ledger.record(Resource::Material(material));

        tracing::info!(scene_id = %state.id, "Text overlay '{text}' added");
        state.text = Some(TextMesh {
            mesh: mesh_handle,
            material,
            text,
            bounds,
        });
    }

    // ── Frames and input ───────────────────────────────────────

    /// Run one frame: update the controls, then draw. Returns `false` when
    /// no render loop is running.
    pub fn advance_frame(&mut self) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if !state.render_loop.tick() {
            return false;
        }
        state.controls.update(&mut state.camera);
        let frame = snapshot(state, self.config.clear_color);
        self.backend.draw(&frame);
        true
    }

    /// Track a new viewport size. Zero-sized viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.viewport {
            return;
        }
        self.viewport = (width, height);
        if let Some(state) = self.state.as_mut() {
            state.camera.aspect = width as f32 / height as f32;
            self.backend.set_viewport_size(width, height);
        }
    }

    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        if let Some(state) = self.state.as_mut() {
            state.controls.rotate(d_yaw, d_pitch);
        }
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        if let Some(state) = self.state.as_mut() {
            state.controls.pan(dx, dy);
        }
    }

    pub fn dolly(&mut self, factor: f32) {
        if let Some(state) = self.state.as_mut() {
            state.controls.dolly(factor);
        }
    }

    /// Replace the configuration. Camera and font settings take effect on
    /// the next load; the clear color applies from the next frame.
    pub fn set_config(&mut self, config: SceneConfig) {
        self.config = config;
    }

    /// Re-fit the camera to the model
    pub fn reset_view(&mut self) {
        if let Some(state) = self.state.as_mut() {
            if let Some(model) = &state.model {
                state.camera.fit(&model.bounds);
            }
        }
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn status(&self) -> SceneStatus {
        self.status
    }

    pub fn scene_id(&self) -> Option<Uuid> {
        self.state.as_ref().map(RenderState::id)
    }

    pub fn is_running(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.render_loop.is_running())
    }

    pub fn has_model(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.model.is_some())
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.state.as_ref().map(|s| &s.camera)
    }

    /// Bounding box of the (centered) background mesh
    pub fn model_bounds(&self) -> Option<Aabb> {
        self.state.as_ref()?.model.as_ref().map(|m| m.bounds)
    }

    pub fn background_color(&self) -> Option<[f32; 3]> {
        self.state
            .as_ref()?
            .model
            .as_ref()
            .map(|m| m.background_material.color)
    }

    pub fn frame_color(&self) -> Option<[f32; 3]> {
        self.state
            .as_ref()?
            .model
            .as_ref()
            .map(|m| m.frame_material.color)
    }

    /// Label currently shown, if the overlay exists
    pub fn text(&self) -> Option<&str> {
        self.state.as_ref()?.text.as_ref().map(|t| t.text.as_str())
    }

    /// Size of the text mesh before scaling
    pub fn text_size(&self) -> Option<Vec3> {
        self.state.as_ref()?.text.as_ref().map(|t| t.bounds.size())
    }

    /// Entries in the release ledger of the active state
    pub fn live_resources(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.ledger.len())
    }

    pub fn frames(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.render_loop.frames())
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: RenderBackend> Drop for SceneManager<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Ambient plus key and fill directional lights, all white
fn scene_lights() -> Vec<Light> {
    vec![
        Light::Ambient {
            color: [1.0; 3],
            intensity: 2.0,
        },
        Light::Directional {
            color: [1.0; 3],
            intensity: 2.5,
            position: Vec3::new(1.0, 1.0, 2.0),
        },
        Light::Directional {
            color: [1.0; 3],
            intensity: 1.5,
            position: Vec3::new(-1.0, -1.0, -2.0),
        },
    ]
}

fn snapshot(state: &RenderState, clear_color: Color32) -> FrameSnapshot {
    let mut items = Vec::with_capacity(3);
    if let Some(model) = &state.model {
        items.push(DrawItem {
            mesh: model.mesh,
            material: model.frame,
            model: Mat4::from_translation(FRAME_OFFSET) * Mat4::from_scale(FRAME_SCALE),
            render_order: 0,
        });
        items.push(DrawItem {
            mesh: model.mesh,
            material: model.background,
            model: Mat4::IDENTITY,
            render_order: 0,
        });
    }
    if let Some(text) = &state.text {
        items.push(DrawItem {
            mesh: text.mesh,
            material: text.material,
            model: Mat4::from_translation(TEXT_OFFSET) * Mat4::from_scale(Vec3::splat(TEXT_SCALE)),
            render_order: TEXT_RENDER_ORDER,
        });
    }
    items.sort_by_key(|item| item.render_order);

    FrameSnapshot {
        view: state.camera.view_matrix(),
        projection: state.camera.projection_matrix(),
        eye: state.camera.eye_position(),
        clear_color: to_rgb_f32(clear_color),
        lights: state.lights.clone(),
        items,
    }
}

/// First non-empty value among `keys`, parsed as a color. Unparsable
/// strings are logged and ignored.
fn pick_color(values: &CustomizationValues, keys: &[&str]) -> Option<[f32; 3]> {
    let value = first_non_empty(values, keys)?;
    match parse_color(value) {
        Some(color) => Some(to_rgb_f32(color)),
        None => {
            tracing::warn!("Ignoring unparsable color '{value}'");
            None
        }
    }
}

/// Label for the text overlay
pub fn label_text(values: &CustomizationValues) -> String {
    first_non_empty(values, &TEXT_KEYS)
        .unwrap_or(FALLBACK_TEXT)
        .to_string()
}

fn first_non_empty<'a>(values: &'a CustomizationValues, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| values.get(*key))
        .map(String::as_str)
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::values;

    #[test]
    fn test_label_text_priority() {
        assert_eq!(label_text(&values(&[])), "BADGER");
        assert_eq!(label_text(&values(&[("nameplate_label", "ACME")])), "ACME");
        assert_eq!(
            label_text(&values(&[("nameplate_label", "ACME"), ("custom_text", "Hi")])),
            "Hi"
        );
        assert_eq!(
            label_text(&values(&[("nameplate_label", "ACME"), ("custom_text", "")])),
            "ACME"
        );
    }

    #[test]
    fn test_pick_color_priority() {
        let v = values(&[("nameplate_background", "#000000"), ("main_color", "#ffffff")]);
        assert_eq!(pick_color(&v, &BACKGROUND_COLOR_KEYS), Some([1.0, 1.0, 1.0]));

        let v = values(&[("nameplate_background", "#000000"), ("main_color", "")]);
        assert_eq!(pick_color(&v, &BACKGROUND_COLOR_KEYS), Some([0.0, 0.0, 0.0]));

        let v = values(&[("accent_color", "nonsense")]);
        assert_eq!(pick_color(&v, &FRAME_COLOR_KEYS), None);
        assert_eq!(pick_color(&values(&[]), &FRAME_COLOR_KEYS), None);
    }

    #[test]
    fn test_lights() {
        let lights = scene_lights();
        assert_eq!(lights.len(), 3);
        assert!(matches!(lights[0], Light::Ambient { intensity, .. } if intensity == 2.0));
    }
}
