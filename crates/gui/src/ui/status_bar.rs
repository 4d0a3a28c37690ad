use egui::Ui;

use crate::scene::SceneStatus;
use crate::state::AppState;

pub fn show(ui: &mut Ui, state: &AppState, scene_status: SceneStatus, has_text: bool) {
    ui.horizontal(|ui| {
        match &state.document {
            Some(document) => {
                ui.weak(document.source.display_name());
                ui.separator();
                ui.weak(format!("Fields: {}", document.template.fields.len()));
            }
            None => {
                ui.weak("No model");
            }
        }

        ui.separator();
        let scene_label = match scene_status {
            SceneStatus::Empty => "Idle",
            SceneStatus::Loading => "Loading…",
            SceneStatus::Reloading => "Reloading…",
            SceneStatus::Ready if has_text => "Ready",
            SceneStatus::Ready => "Ready (label pending)",
            SceneStatus::Disposed => "Closed",
        };
        ui.weak(scene_label);

        if let Some(message) = &state.status_message {
            ui.separator();
            ui.label(message);
        }

        // Right-aligned version
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(concat!("STL Customizer v", env!("CARGO_PKG_VERSION")));
        });
    });
}
