use std::collections::HashSet;

use crate::grammar;
use crate::{FieldKind, ParsedTemplate, TemplateField};

/// Scan model text for directives and build the field list.
///
/// Fields appear in file order; the first occurrence of an id wins. When no
/// directive is found, or `use_defaults` is set (demo mode), the fixed
/// fallback set is used instead so the form is never empty.
pub fn extract(raw_text: &str, use_defaults: bool) -> ParsedTemplate {
    let mut fields = if use_defaults {
        Vec::new()
    } else {
        identify_fields(raw_text)
    };

    if fields.is_empty() {
        tracing::debug!(use_defaults, "Using fallback template fields");
        fields = fallback_fields();
    }

    tracing::debug!("Extracted {} template fields", fields.len());

    ParsedTemplate {
        fields,
        raw_text: raw_text.to_string(),
    }
}

/// Background color, frame color and label text of the stock nameplate
pub fn fallback_fields() -> Vec<TemplateField> {
    vec![
        TemplateField::new(
            "nameplate_background",
            FieldKind::Color,
            "Background Color",
            "#FFA500",
        ),
        TemplateField::new("nameplate_frame", FieldKind::Color, "Frame Color", "#333333"),
        TemplateField::new("nameplate_label", FieldKind::Text, "Text", "BADGER"),
    ]
}

fn identify_fields(raw_text: &str) -> Vec<TemplateField> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();

    for line in raw_text.split('\n') {
        let Some(directive) = grammar::parse(line) else {
            continue;
        };
        let id = directive.id.to_ascii_lowercase();
        if !seen.insert(id.clone()) {
            tracing::debug!(%id, "Ignoring repeated directive");
            continue;
        }
        fields.push(TemplateField {
            label: derive_label(directive.id),
            default_value: normalize_value(directive.kind, directive.value),
            kind: directive.kind,
            id,
        });
    }

    fields
}

/// `nameplate_label` -> `nameplate label`
fn derive_label(id: &str) -> String {
    id.replace('_', " ").trim().to_string()
}

/// Colors always carry a leading `#`; text is kept as written
pub(crate) fn normalize_value(kind: FieldKind, value: &str) -> String {
    match kind {
        FieldKind::Color if !value.starts_with('#') => format!("#{value}"),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "solid plate\n\
        # TEMPLATE_COLOR_main_color FF0000\n\
        # TEMPLATE_TEXT_custom_text Hello\n\
        # TEMPLATE_COLOR_accent_color #00ff00\n\
        facet normal 0 0 1\n\
        endsolid plate\n";

    #[test]
    fn test_extract_in_file_order() {
        let t = extract(TEMPLATE, false);
        let ids: Vec<&str> = t.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["main_color", "custom_text", "accent_color"]);
        assert_eq!(t.raw_text, TEMPLATE);
    }

    #[test]
    fn test_color_gets_hash_prefix() {
        let t = extract("# TEMPLATE_COLOR_foo bar\n", false);
        assert_eq!(t.fields[0].default_value, "#bar");
        let t = extract("# TEMPLATE_COLOR_foo #bar\n", false);
        assert_eq!(t.fields[0].default_value, "#bar");
    }

    #[test]
    fn test_text_without_hash_is_untouched() {
        let t = extract("# TEMPLATE_TEXT_foo bar\n", false);
        assert_eq!(t.fields[0].default_value, "bar");
        assert_eq!(t.fields[0].kind, FieldKind::Text);
    }

    #[test]
    fn test_label_from_id() {
        let t = extract("# TEMPLATE_TEXT_custom_text_ x\n", false);
        assert_eq!(t.fields[0].label, "custom text");
    }

    #[test]
    fn test_ids_lowercased_and_deduplicated() {
        let t = extract(
            "# TEMPLATE_COLOR_Main #111111\n# TEMPLATE_COLOR_main #222222\n",
            false,
        );
        assert_eq!(t.fields.len(), 1);
        assert_eq!(t.fields[0].id, "main");
        assert_eq!(t.fields[0].default_value, "#111111");
    }

    #[test]
    fn test_no_directives_gives_fallback() {
        let t = extract("solid x\nfacet normal 0 0 1\nendsolid x\n", false);
        let ids: Vec<&str> = t.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["nameplate_background", "nameplate_frame", "nameplate_label"]
        );
        assert_eq!(t.fields[2].default_value, "BADGER");
    }

    #[test]
    fn test_empty_input_gives_fallback() {
        let t = extract("", false);
        assert_eq!(t.fields, fallback_fields());
        assert_eq!(t.raw_text, "");
    }

    #[test]
    fn test_use_defaults_overrides_directives() {
        let t = extract(TEMPLATE, true);
        assert_eq!(t.fields, fallback_fields());
        assert_eq!(t.raw_text, TEMPLATE);
    }

    #[test]
    fn test_walls_never_extracted() {
        let t = extract(
            "# TEMPLATE_COLOR_side_walls #000000\n# TEMPLATE_TEXT_title Hi\n",
            false,
        );
        assert_eq!(t.fields.len(), 1);
        assert_eq!(t.fields[0].id, "title");
    }

    #[test]
    fn test_only_walls_falls_back() {
        let t = extract("# TEMPLATE_COLOR_walls #000000\n", false);
        assert_eq!(t.fields, fallback_fields());
    }

    #[test]
    fn test_crlf_lines() {
        let t = extract("solid x\r\n# TEMPLATE_TEXT_title Hi\r\n", false);
        assert_eq!(t.fields[0].default_value, "Hi");
    }
}
