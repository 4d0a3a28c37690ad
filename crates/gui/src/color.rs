//! Color strings as stored in customization values.

use egui::Color32;

/// Named colors accepted besides hex notation
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("silver", [192, 192, 192]),
    ("gold", [255, 215, 0]),
    ("navy", [0, 0, 128]),
];

/// Parse `#RGB`, `#RRGGBB`, `#RRGGBBAA` or a named color.
/// Returns `None` for anything else.
pub fn parse_color(value: &str) -> Option<Color32> {
    let value = value.trim();
    if value.starts_with('#') {
        return match value.len() {
            4 | 7 | 9 => Color32::from_hex(value).ok(),
            _ => None,
        };
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, [r, g, b])| Color32::from_rgb(*r, *g, *b))
}

/// `#rrggbb`, the form written back by the color picker
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// 0..1 sRGB components for shader uniforms (alpha ignored)
pub fn to_rgb_f32(color: Color32) -> [f32; 3] {
    [
        color.r() as f32 / 255.0,
        color.g() as f32 / 255.0,
        color.b() as f32 / 255.0,
    ]
}
