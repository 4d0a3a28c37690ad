//! Typeface fonts and extruded text meshes for the label overlay.
//!
//! Fonts use the typeface JSON layout: a map of glyphs, each with an
//! advance (`ha`) and an outline command string (`o`) in font units.

pub mod fetch;
pub mod outline;
pub mod text_mesh;
pub mod triangulate;

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

pub use fetch::{FontFetcher, FontRequest, FontResult};
pub use text_mesh::{build_text_mesh, TextStyle};

/// Why the label font could not be made available
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FontError {
    #[error("font setup failed: {0}")]
    SetupFailed(String),
    #[error("font request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("font request failed: {0}")]
    Network(String),
    #[error("invalid typeface JSON: {0}")]
    InvalidTypeface(String),
}

/// Font bounding box in font units
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "xMin", default)]
    pub x_min: f64,
    #[serde(rename = "xMax", default)]
    pub x_max: f64,
    #[serde(rename = "yMin", default)]
    pub y_min: f64,
    #[serde(rename = "yMax", default)]
    pub y_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units
    pub ha: f64,
    /// Outline commands; absent for blank glyphs such as space
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Typeface {
    pub glyphs: HashMap<String, Glyph>,
    #[serde(rename = "familyName", default)]
    pub family_name: String,
    /// Font units per em
    pub resolution: f64,
    #[serde(rename = "boundingBox", default)]
    pub bounding_box: BoundingBox,
    #[serde(rename = "underlineThickness", default)]
    pub underline_thickness: f64,
}

impl Typeface {
    pub fn from_json(json: &str) -> Result<Self, FontError> {
        let typeface: Typeface =
            serde_json::from_str(json).map_err(|e| FontError::InvalidTypeface(e.to_string()))?;
        if typeface.resolution <= 0.0 {
            return Err(FontError::InvalidTypeface(format!(
                "resolution must be positive, got {}",
                typeface.resolution
            )));
        }
        tracing::debug!(
            family = %typeface.family_name,
            glyphs = typeface.glyphs.len(),
            "Parsed typeface"
        );
        Ok(typeface)
    }

    /// Glyph for `c`, falling back to `?` for characters the font lacks
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs
            .get(c.encode_utf8(&mut buf) as &str)
            .or_else(|| {
                tracing::warn!(
                    "Character '{c}' does not exist in font family {}",
                    self.family_name
                );
                self.glyphs.get("?")
            })
    }

    /// Distance between baselines for text of the given size
    pub fn line_height(&self, size: f64) -> f64 {
        let bb = self.bounding_box;
        (bb.y_max - bb.y_min + self.underline_thickness) * size / self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_typeface;

    #[test]
    fn test_parse_typeface() {
        let t = test_typeface();
        assert_eq!(t.family_name, "Test");
        assert_eq!(t.glyphs.len(), 5);
        assert!(t.glyphs[" "].o.is_none());
        assert_eq!(t.line_height(100.0), 130.0);
    }

    #[test]
    fn test_missing_glyph_falls_back_to_question_mark() {
        let t = test_typeface();
        assert_eq!(t.glyph('Z').map(|g| g.ha), Some(50.0));
        assert_eq!(t.glyph('I').map(|g| g.ha), Some(40.0));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Typeface::from_json("{\"glyphs\": 3}"),
            Err(FontError::InvalidTypeface(_))
        ));
        assert!(matches!(
            Typeface::from_json(r#"{"glyphs": {}, "resolution": 0}"#),
            Err(FontError::InvalidTypeface(_))
        ));
    }
}
