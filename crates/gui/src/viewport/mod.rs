//! 3D preview panel with OpenGL rendering

mod gl_renderer;
pub use customizer_gui_lib::viewport::{bounds, camera, controls, mesh};

use std::f32::consts::TAU;
use std::sync::{Arc, Mutex};

use egui::Ui;

use crate::font::FontFetcher;
use crate::scene::sync::SceneSync;
use crate::scene::{SceneConfig, SceneManager, SceneStatus};
use crate::state::AppState;
use gl_renderer::{GlBackend, GlQueue, GlRenderer, SharedQueue};

/// Scroll distance (points) that halves or doubles the camera distance
const SCROLL_PER_OCTAVE: f32 = 400.0;

/// Preview panel: owns the scene, its GL renderer and the font fetcher
pub struct ViewportPanel {
    scene: SceneManager<GlBackend>,
    queue: SharedQueue,
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    sync: SceneSync,
    fetcher: FontFetcher,
}

impl ViewportPanel {
    pub fn new(config: SceneConfig) -> Self {
        let queue: SharedQueue = Arc::new(Mutex::new(GlQueue::default()));
        Self {
            scene: SceneManager::new(GlBackend::new(queue.clone()), config),
            queue,
            gl_renderer: None,
            sync: SceneSync::new(),
            fetcher: FontFetcher::new(),
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        match GlRenderer::new(gl) {
            Ok(renderer) => self.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Err(e) => tracing::error!("OpenGL preview unavailable: {e}"),
        }
    }

    /// Free GPU resources (call from `eframe::App::on_exit`)
    pub fn destroy_gl(&mut self, gl: &glow::Context) {
        self.scene.dispose();
        if let Some(renderer) = self.gl_renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(gl);
            }
        }
    }

    pub fn reset_camera(&mut self) {
        self.scene.reset_view();
    }

    /// Apply changed settings; the scene is rebuilt on the next frame
    pub fn apply_config(&mut self, config: SceneConfig) {
        if *self.scene.config() != config {
            self.scene.set_config(config);
            self.sync.invalidate();
        }
    }

    pub fn status(&self) -> SceneStatus {
        self.scene.status()
    }

    pub fn has_text(&self) -> bool {
        self.scene.text().is_some()
    }

    /// Bring the scene in step with the state and pick up finished font loads
    fn sync_scene(&mut self, state: &AppState) {
        if let Some(request) = self.sync.sync(state, &mut self.scene) {
            self.fetcher.request(request);
        }
        for result in self.fetcher.poll() {
            if let Err(e) = &result.result {
                tracing::warn!("Label font unavailable: {e}");
            }
            self.scene.deliver_font(result);
        }
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        self.sync_scene(state);

        let ppp = ui.ctx().pixels_per_point();
        let width = (rect.width() * ppp).round().max(0.0) as u32;
        let height = (rect.height() * ppp).round().max(0.0) as u32;
        self.scene.resize(width, height);

        self.handle_camera_input(ui, &response, rect);

        let drew = self.scene.advance_frame();
        if self.gl_renderer.is_none() {
            if let Ok(mut q) = self.queue.lock() {
                q.discard_commands();
            }
        }

        if !ui.is_rect_visible(rect) {
            return;
        }

        if drew {
            self.render_gl(ui, rect);
            ui.ctx().request_repaint();
        } else {
            ui.painter()
                .rect_filled(rect, 0.0, self.scene.config().clear_color);
        }

        self.draw_overlays(ui, rect, state);
    }

    fn handle_camera_input(&mut self, ui: &Ui, response: &egui::Response, rect: egui::Rect) {
        let height = rect.height().max(1.0);

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            self.scene.orbit(-TAU * delta.x / height, TAU * delta.y / height);
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            // World units per point at the target's depth
            let scale = self
                .scene
                .camera()
                .map(|c| 2.0 * c.distance * (c.fov * 0.5).tan() / height)
                .unwrap_or(0.0);
            self.scene.pan(-delta.x * scale, delta.y * scale);
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.scene.dolly(2f32.powf(-scroll / SCROLL_PER_OCTAVE));
            }
        }

        if response.double_clicked() {
            self.scene.reset_view();
        }
    }

    fn render_gl(&self, ui: &mut Ui, rect: egui::Rect) {
        let Some(gl_renderer) = &self.gl_renderer else {
            return;
        };
        let renderer = gl_renderer.clone();
        let queue = self.queue.clone();

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let clip = info.viewport_in_pixels();
                let viewport = [clip.left_px, clip.from_bottom_px, clip.width_px, clip.height_px];
                if let (Ok(mut r), Ok(mut q)) = (renderer.lock(), queue.lock()) {
                    r.paint(painter.gl(), viewport, &mut q);
                }
            })),
        };
        ui.painter().add(callback);
    }

    fn draw_overlays(&self, ui: &Ui, rect: egui::Rect, state: &AppState) {
        let painter = ui.painter_at(rect);
        let hint_color = egui::Color32::from_rgb(90, 90, 100);

        let message = if state.document.is_none() {
            Some("Open an STL file or load the demo (File menu)")
        } else if self.gl_renderer.is_none() {
            Some("OpenGL is not available; the preview is disabled")
        } else if !self.scene.has_model() && self.scene.status() == SceneStatus::Ready {
            Some("No renderable geometry in this file")
        } else {
            None
        };
        if let Some(message) = message {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::proportional(15.0),
                hint_color,
            );
        }

        if state.document.is_some() {
            painter.text(
                egui::pos2(rect.center().x, rect.bottom() - 12.0),
                egui::Align2::CENTER_BOTTOM,
                "Drag to orbit · Right-drag to pan · Scroll to zoom · Double-click to reset",
                egui::FontId::proportional(11.0),
                hint_color,
            );
        }
    }
}
