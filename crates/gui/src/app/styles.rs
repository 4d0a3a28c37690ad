//! Application look and feel

use eframe::egui;

/// Accent used for selection and focused widgets (matches the demo plate)
const ACCENT: egui::Color32 = egui::Color32::from_rgb(0xE0, 0x8C, 0x00);

/// Set up the light theme and text sizes
pub fn configure_styles(ctx: &egui::Context, font_size: f32) {
    let mut style = (*ctx.style()).clone();

    style.visuals = egui::Visuals::light();
    style.visuals.window_corner_radius = egui::CornerRadius::same(8);
    style.visuals.menu_corner_radius = egui::CornerRadius::same(4);
    for widget in [
        &mut style.visuals.widgets.inactive,
        &mut style.visuals.widgets.hovered,
        &mut style.visuals.widgets.active,
    ] {
        widget.corner_radius = egui::CornerRadius::same(4);
    }

    style.visuals.panel_fill = egui::Color32::from_rgb(248, 248, 250);
    style.visuals.selection.bg_fill = ACCENT.linear_multiply(0.6);
    style.visuals.selection.stroke = egui::Stroke::new(1.0, ACCENT);

    // Roomier form rows
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.interact_size.y = font_size + 8.0;

    apply_text_styles(&mut style, font_size);
    ctx.set_style(style);
}

/// Re-apply text sizes after the font size setting changed
pub fn apply_font_size(ctx: &egui::Context, font_size: f32) {
    let mut style = (*ctx.style()).clone();
    apply_text_styles(&mut style, font_size);
    ctx.set_style(style);
}

fn apply_text_styles(style: &mut egui::Style, font_size: f32) {
    use egui::{FontId, TextStyle};

    let sizes = [
        (TextStyle::Body, FontId::proportional(font_size)),
        (TextStyle::Button, FontId::proportional(font_size)),
        (TextStyle::Small, FontId::proportional(font_size * 0.8)),
        (TextStyle::Heading, FontId::proportional(font_size * 1.4)),
        (TextStyle::Monospace, FontId::monospace(font_size * 0.95)),
    ];
    style.text_styles.extend(sizes);
}
