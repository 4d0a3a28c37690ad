//! Integration tests for the load -> customize -> export pipeline.
//!
//! Tests end-to-end: model bytes -> load_model_file -> CustomizationStore -> ExportArtifact.

use stl_template::{
    demo_template, export, extract, load_model_file, CustomizationStore, ExportArtifact,
    DEMO_STL,
};

const PLATE: &str = "solid plate\n\
# TEMPLATE_COLOR_main_color FF0000\n\
# TEMPLATE_COLOR_accent_color #00ff00\n\
# TEMPLATE_TEXT_custom_text Hello\n\
# TEMPLATE_COLOR_side_walls #000000\n\
facet normal 0 0 1\n\
  outer loop\n\
    vertex 0 0 0\n\
    vertex 1 0 0\n\
    vertex 0 1 0\n\
  endloop\n\
endfacet\n\
endsolid plate\n";

#[test]
fn test_untouched_export_is_identical() {
    let template = load_model_file("plate.stl", PLATE.as_bytes(), false).unwrap();
    let store = CustomizationStore::from_template(&template);
    let artifact = ExportArtifact::build(&template, store.values());
    assert_eq!(artifact.bytes, PLATE.as_bytes());
}

#[test]
fn test_edit_then_export() {
    let template = load_model_file("plate.stl", PLATE.as_bytes(), false).unwrap();
    assert_eq!(template.fields.len(), 3);

    let mut store = CustomizationStore::from_template(&template);
    assert!(store.set("custom_text", "World"));
    assert!(store.set("main_color", "#0000ff"));
    assert!(!store.set("side_walls", "#ffffff"));

    let out = export(&template.raw_text, &template.fields, store.values());
    let expected = PLATE
        .replace(
            "# TEMPLATE_COLOR_main_color FF0000",
            "# TEMPLATE_MAIN_COLOR_main_color #0000ff",
        )
        .replace(
            "# TEMPLATE_TEXT_custom_text Hello",
            "# TEMPLATE_CUSTOM_TEXT_custom_text World",
        );
    assert_eq!(out, expected);
}

#[test]
fn test_reload_of_exported_file_keeps_fields() {
    let template = extract(PLATE, false);
    let mut store = CustomizationStore::from_template(&template);
    store.set("custom_text", "World");
    let out = export(&template.raw_text, &template.fields, store.values());

    // Rewritten lines no longer carry a kind, so only untouched directives remain
    let reloaded = extract(&out, false);
    let ids: Vec<&str> = reloaded.fields.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["main_color", "accent_color"]);

    // The stored values still reach the rewritten line on a second export
    store.set("custom_text", "Again");
    let again = export(&out, &template.fields, store.values());
    assert!(again.contains("# TEMPLATE_CUSTOM_TEXT_custom_text Again\n"));
}

#[test]
fn test_binary_bytes_survive() {
    let mut bytes = vec![0u8; 80];
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend((0..50).map(|i| (i * 5) as u8));
    bytes[0x10] = 0xFF;

    let template = load_model_file("part.STL", &bytes, false).unwrap();
    assert_eq!(template.fields.len(), 3, "binary file uses the fallback set");
    let artifact = ExportArtifact::build(&template, &template.default_values());
    assert_eq!(artifact.bytes, bytes);
}

#[test]
fn test_demo_export() {
    let template = demo_template();
    let mut store = CustomizationStore::from_template(&template);
    store.set("nameplate_label", "ACME");
    store.set("nameplate_frame", "#333333");

    let artifact = ExportArtifact::build(&template, store.values());
    let text = String::from_utf8(artifact.bytes).unwrap();
    assert_eq!(
        text,
        DEMO_STL.replace(
            "# TEMPLATE_TEXT_nameplate_label BADGER",
            "# TEMPLATE_NAMEPLATE_LABEL_nameplate_label ACME"
        )
    );
}

#[test]
fn test_invalid_file_type() {
    let err = load_model_file("plate.obj", PLATE.as_bytes(), false).unwrap_err();
    assert_eq!(err.to_string(), "'plate.obj' is not an STL file");
}
