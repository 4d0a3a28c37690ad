//! Keyboard shortcut handling

use eframe::egui;

use super::menus;
use crate::state::AppState;
use crate::viewport::ViewportPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shortcut {
    Open,
    Export,
    ResetView,
}

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState, viewport: &mut ViewportPanel) {
    // Plain keys belong to a focused text field
    let typing = ctx.memory(|m| m.focused().is_some());

    let shortcut = ctx.input(|i| {
        if i.modifiers.command && i.key_pressed(egui::Key::O) {
            Some(Shortcut::Open)
        } else if i.modifiers.command && (i.key_pressed(egui::Key::S) || i.key_pressed(egui::Key::E)) {
            Some(Shortcut::Export)
        } else if !typing
            && !i.modifiers.command
            && (i.key_pressed(egui::Key::F) || i.key_pressed(egui::Key::R))
        {
            Some(Shortcut::ResetView)
        } else {
            None
        }
    });

    // Dialogs block, so they run outside the input closure
    match shortcut {
        Some(Shortcut::Open) => menus::open_model_dialog(state),
        Some(Shortcut::Export) => menus::export_dialog(state),
        Some(Shortcut::ResetView) => viewport.reset_camera(),
        None => {}
    }
}
