//! Factory functions for creating test data.
//!
//! Small typefaces, STL snippets and value maps shared by unit tests,
//! integration tests and the headless harness.

use std::collections::HashMap;

use stl_template::CustomizationValues;

use crate::font::Typeface;

// ── Fonts ───────────────────────────────────────────────────────

/// Typeface JSON with a handful of glyphs in a 100-unit em.
///
/// `I` is a 20×100 bar, `O` a square ring, `C` has curves, `?` a 50-wide
/// block and space is blank.
pub const TEST_TYPEFACE_JSON: &str = r#"{
    "familyName": "Test",
    "resolution": 100,
    "underlineThickness": 10,
    "boundingBox": { "xMin": 0, "xMax": 100, "yMin": -20, "yMax": 100 },
    "glyphs": {
        "I": { "ha": 40, "o": "m 0 0 l 20 0 l 20 100 l 0 100 z" },
        "O": { "ha": 100, "o": "m 0 0 l 80 0 l 80 100 l 0 100 z m 20 20 l 20 80 l 60 80 l 60 20 z" },
        "C": { "ha": 90, "o": "m 0 0 l 80 0 l 80 20 q 20 50 20 20 q 80 80 20 80 l 80 100 l 0 100 z" },
        "?": { "ha": 50, "o": "m 0 0 l 40 0 l 40 100 l 0 100 z" },
        " ": { "ha": 30 }
    }
}"#;

/// Parsed [`TEST_TYPEFACE_JSON`]
pub fn test_typeface() -> Typeface {
    match Typeface::from_json(TEST_TYPEFACE_JSON) {
        Ok(typeface) => typeface,
        Err(e) => panic!("test typeface must parse: {e}"),
    }
}

// ── STL snippets ────────────────────────────────────────────────

/// Axis-aligned square plate, 10 × 4 in XY, 2 triangles
pub fn plate_stl(directives: &[&str]) -> String {
    let mut text = String::from("solid plate\n");
    for line in directives {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str(
        "  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n      vertex 10 0 0\n      vertex 10 4 0\n    endloop\n  endfacet\n",
    );
    text.push_str(
        "  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n      vertex 10 4 0\n      vertex 0 4 0\n    endloop\n  endfacet\n",
    );
    text.push_str("endsolid plate\n");
    text
}

/// Binary STL with the given triangles, decoded one byte per char
pub fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> String {
    let mut bytes = vec![0u8; 80];
    bytes[..6].copy_from_slice(b"binary");
    bytes.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for tri in triangles {
        bytes.extend_from_slice(&[0u8; 12]);
        for vertex in tri {
            for c in vertex {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        bytes.extend_from_slice(&[0u8; 2]);
    }
    stl_template::model_text::decode(&bytes)
}

// ── Values ──────────────────────────────────────────────────────

/// Build a value map from pairs
pub fn values(pairs: &[(&str, &str)]) -> CustomizationValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<HashMap<_, _>>()
}

/// The fallback nameplate values
pub fn nameplate_values() -> CustomizationValues {
    values(&[
        ("nameplate_background", "#FFA500"),
        ("nameplate_frame", "#333333"),
        ("nameplate_label", "BADGER"),
    ])
}
