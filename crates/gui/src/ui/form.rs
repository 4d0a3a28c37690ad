//! Customization form: one row per template field

use egui::Ui;
use stl_template::{FieldKind, TemplateField};

use crate::color::{parse_color, to_hex};
use crate::state::AppState;

/// Swatch shown for a value that is not a readable color
const UNKNOWN_COLOR: egui::Color32 = egui::Color32::from_rgb(128, 128, 128);

/// Edit requested by a row, applied after the field list is released
enum RowEdit {
    Set(String),
    Reset,
}

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Customize");
    ui.add_space(4.0);

    let Some(document) = &state.document else {
        ui.weak("No model loaded.");
        ui.add_space(6.0);
        if ui.button("Load demo nameplate").clicked() {
            state.open_demo();
        }
        return;
    };
    ui.weak(document.source.display_name());
    ui.separator();

    let fields: Vec<TemplateField> = state.store.fields().to_vec();
    if fields.is_empty() {
        ui.weak("This model has no customizable fields.");
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for field in &fields {
                let current = state.store.get(&field.id).unwrap_or_default().to_string();
                let overridden = state.store.is_overridden(&field.id);

                ui.push_id(&field.id, |ui| {
                    match field_row(ui, field, &current, overridden) {
                        Some(RowEdit::Set(value)) => {
                            state.set_value(&field.id, value);
                        }
                        Some(RowEdit::Reset) => {
                            state.store.reset(&field.id);
                        }
                        None => {}
                    }
                });
                ui.add_space(6.0);
            }
        });
}

fn field_row(ui: &mut Ui, field: &TemplateField, current: &str, overridden: bool) -> Option<RowEdit> {
    let mut edit = None;

    ui.horizontal(|ui| {
        ui.strong(&field.label);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let reset = ui
                .add_enabled(overridden, egui::Button::new("↺").small())
                .on_hover_text(format!("Reset to {}", field.default_value));
            if reset.clicked() {
                edit = Some(RowEdit::Reset);
            }
        });
    });

    match field.kind {
        FieldKind::Color => {
            ui.horizontal(|ui| {
                let mut color = parse_color(current).unwrap_or(UNKNOWN_COLOR);
                if ui.color_edit_button_srgba(&mut color).changed() {
                    edit = Some(RowEdit::Set(to_hex(color)));
                }
                let mut text = current.to_string();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut text)
                        .desired_width(90.0)
                        .font(egui::TextStyle::Monospace),
                );
                if response.changed() {
                    edit = Some(RowEdit::Set(text));
                }
            });
        }
        FieldKind::Text => {
            let mut text = current.to_string();
            let response = ui.add(
                egui::TextEdit::singleline(&mut text)
                    .desired_width(f32::INFINITY)
                    .hint_text(&field.default_value),
            );
            if response.changed() {
                edit = Some(RowEdit::Set(text));
            }
        }
    }

    edit
}
