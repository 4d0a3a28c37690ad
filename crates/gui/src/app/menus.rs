//! Application menu bar, file dialogs and settings window

use std::path::Path;

use eframe::egui;

use crate::state::settings::AppSettings;
use crate::state::AppState;
use crate::viewport::ViewportPanel;

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("File", |ui| {
        if ui.button("Open STL…").clicked() {
            ui.close_menu();
            open_model_dialog(state);
        }
        if ui.button("Load demo").clicked() {
            ui.close_menu();
            state.open_demo();
        }
        ui.separator();
        if ui
            .add_enabled(state.document.is_some(), egui::Button::new("Export customized STL…"))
            .clicked()
        {
            ui.close_menu();
            export_dialog(state);
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, viewport: &mut ViewportPanel) {
    ui.menu_button("View", |ui| {
        if ui.button("Reset camera").clicked() {
            viewport.reset_camera();
            ui.close_menu();
        }
    });
}

/// Show the settings menu
pub fn settings_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("Settings", |ui| {
        if ui.button("Preferences…").clicked() {
            state.show_settings_window = true;
            ui.close_menu();
        }
    });
}

/// Pick an STL file and load it as the new template
pub fn open_model_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Open STL template")
        .add_filter("STL", &["stl", "STL"]);
    if let Some(dir) = &state.settings.last_directory {
        dialog = dialog.set_directory(dir);
    }
    let Some(path) = dialog.pick_file() else {
        return;
    };
    open_model_path(state, &path);
}

/// Load a model from disk, reporting failures in the status bar
pub fn open_model_path(state: &mut AppState, path: &Path) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match std::fs::read(path) {
        Ok(bytes) => {
            if state.open_file(&name, Some(path.to_path_buf()), &bytes).is_ok() {
                remember_directory(state, path);
            }
        }
        Err(e) => {
            tracing::error!("Failed to read {}: {e}", path.display());
            state.status_message = Some(format!("Could not read {name}: {e}"));
        }
    }
}

/// Write the customized model chosen by a save dialog
pub fn export_dialog(state: &mut AppState) {
    let Some(artifact) = state.export() else {
        return;
    };
    let mut dialog = rfd::FileDialog::new()
        .set_title("Export customized STL")
        .add_filter("STL", &["stl"])
        .set_file_name(artifact.file_name);
    if let Some(dir) = &state.settings.last_directory {
        dialog = dialog.set_directory(dir);
    }
    let Some(path) = dialog.save_file() else {
        return;
    };
    match std::fs::write(&path, &artifact.bytes) {
        Ok(()) => {
            tracing::info!(bytes = artifact.bytes.len(), "Exported {}", path.display());
            state.status_message = Some(format!("Exported {}", path.display()));
            remember_directory(state, &path);
        }
        Err(e) => {
            tracing::error!("Failed to write {}: {e}", path.display());
            state.status_message = Some(format!("Export failed: {e}"));
        }
    }
}

fn remember_directory(state: &mut AppState, path: &Path) {
    if let Some(dir) = path.parent() {
        state.settings.last_directory = Some(dir.to_path_buf());
        state.settings.save();
    }
}

/// Show the settings window
pub fn settings_window(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_settings_window {
        return;
    }
    let mut open = true;
    egui::Window::new("Preferences")
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .default_width(360.0)
        .show(ctx, |ui| {
            show_viewport_settings(ui, state);
            show_font_settings(ui, state);
            show_ui_settings(ui, state);
            show_settings_buttons(ui, state);
        });
    if !open {
        state.show_settings_window = false;
    }
}

fn show_viewport_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Viewport");
    let viewport = &mut state.settings.viewport;
    ui.horizontal(|ui| {
        ui.label("Background");
        let [r, g, b] = viewport.background_color;
        let mut color = egui::Color32::from_rgb(r, g, b);
        if ui.color_edit_button_srgba(&mut color).changed() {
            viewport.background_color = [color.r(), color.g(), color.b()];
        }
    });
    ui.horizontal(|ui| {
        ui.label("Field of view");
        ui.add(
            egui::DragValue::new(&mut viewport.fov_degrees)
                .speed(0.5)
                .range(10.0..=150.0)
                .suffix("°"),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Orbit damping");
        ui.add(egui::Slider::new(&mut viewport.damping, 0.01..=1.0));
    });
    ui.add_space(10.0);
}

fn show_font_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Label font");
    egui::Grid::new("font_settings").num_columns(2).show(ui, |ui| {
        ui.label("Setup URL");
        ui.add(egui::TextEdit::singleline(&mut state.settings.font.setup_url).hint_text("(none)"));
        ui.end_row();
        ui.label("Typeface URL");
        ui.text_edit_singleline(&mut state.settings.font.typeface_url);
        ui.end_row();
    });
    ui.add_space(10.0);
}

fn show_ui_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Interface");
    ui.horizontal(|ui| {
        ui.label("Font size");
        ui.add(
            egui::DragValue::new(&mut state.settings.ui.font_size)
                .speed(0.5)
                .range(8.0..=24.0)
                .suffix(" pt"),
        );
    });
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, state: &mut AppState) {
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Save").clicked() {
            state.settings.save();
        }
        if ui.button("Defaults").clicked() {
            let last_directory = state.settings.last_directory.take();
            state.settings = AppSettings {
                last_directory,
                ..AppSettings::default()
            };
        }
        if ui.button("Close").clicked() {
            state.show_settings_window = false;
        }
    });
}
