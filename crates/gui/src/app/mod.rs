//! Main application module

mod keyboard;
mod menus;
mod styles;

use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{form, status_bar};
use crate::viewport::ViewportPanel;

/// Model to show at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupModel {
    Demo,
    File(PathBuf),
}

/// Main application
pub struct CustomizerApp {
    state: AppState,
    viewport: ViewportPanel,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
}

impl CustomizerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, startup: Option<StartupModel>) -> Self {
        let mut state = AppState::default();

        match startup {
            Some(StartupModel::Demo) => state.open_demo(),
            Some(StartupModel::File(path)) => menus::open_model_path(&mut state, &path),
            None => {}
        }

        styles::configure_styles(&cc.egui_ctx, state.settings.ui.font_size);

        let mut viewport = ViewportPanel::new(state.settings.scene_config());

        // Initialize GL renderer if glow context is available
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        let last_font_size = state.settings.ui.font_size;
        Self {
            state,
            viewport,
            last_font_size,
        }
    }
}

impl eframe::App for CustomizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.state.settings.ui.font_size);
            self.last_font_size = self.state.settings.ui.font_size;
        }
        self.viewport.apply_config(self.state.settings.scene_config());

        keyboard::handle_keyboard(ctx, &mut self.state, &mut self.viewport);

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state);
                menus::view_menu(ui, &mut self.viewport);
                menus::settings_menu(ui, &mut self.state);
            });
        });

        menus::settings_window(ctx, &mut self.state);

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(
                    ui,
                    &self.state,
                    self.viewport.status(),
                    self.viewport.has_text(),
                );
            });

        // ── Left panel: customization form ───────────────────
        egui::SidePanel::left("customize")
            .default_width(260.0)
            .width_range(200.0..=420.0)
            .resizable(true)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(10)))
            .show(ctx, |ui| {
                form::show(ui, &mut self.state);
                if self.state.document.is_some() {
                    ui.separator();
                    if ui
                        .add_sized([ui.available_width(), 28.0], egui::Button::new("Export STL…"))
                        .clicked()
                    {
                        menus::export_dialog(&mut self.state);
                    }
                }
            });

        // ── Central panel: 3D preview ────────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.state);
            });
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            self.viewport.destroy_gl(gl);
        }
        self.state.settings.save();
    }
}
