use std::collections::HashSet;

use crate::extract::normalize_value;
use crate::grammar;
use crate::model_text;
use crate::{CustomizationValues, ParsedTemplate, TemplateField};

/// File name of every exported model
pub const EXPORT_FILE_NAME: &str = "customized.stl";
/// MIME type of every exported model
pub const EXPORT_CONTENT_TYPE: &str = "model/stl";

/// Downloadable result of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Package exported text, one byte per char
    pub fn from_text(text: &str) -> Self {
        Self {
            file_name: EXPORT_FILE_NAME,
            content_type: EXPORT_CONTENT_TYPE,
            bytes: model_text::encode(text),
        }
    }

    /// Export `template` with `values` and package the result
    pub fn build(template: &ParsedTemplate, values: &CustomizationValues) -> Self {
        Self::from_text(&export(&template.raw_text, &template.fields, values))
    }
}

enum LineEdit<'a> {
    NotDirective,
    /// Directive for a known id whose value already matches
    Unchanged(&'a str),
    Rewritten(&'a str, String),
}

/// Rewrite directive lines with the given values.
///
/// Every directive line whose id has an entry in `values` becomes
/// `# TEMPLATE_<ID_UPPER>_<id> <value>` (leading indentation kept), unless
/// the line already holds that value or the value is still the field's
/// default. All other bytes, line endings
/// included, are copied unchanged. Values without a matching line are
/// dropped; no line is appended for them.
pub fn export(raw_text: &str, fields: &[TemplateField], values: &CustomizationValues) -> String {
    let mut out = String::with_capacity(raw_text.len());
    let mut matched: HashSet<&str> = HashSet::new();

    for segment in raw_text.split_inclusive('\n') {
        let (line, ending) = split_line_ending(segment);
        match edit_line(line, fields, values) {
            LineEdit::NotDirective => out.push_str(line),
            LineEdit::Unchanged(id) => {
                matched.insert(id);
                out.push_str(line);
            }
            LineEdit::Rewritten(id, new_line) => {
                matched.insert(id);
                out.push_str(&new_line);
            }
        }
        out.push_str(ending);
    }

    for id in values.keys().filter(|id| !matched.contains(id.as_str())) {
        tracing::debug!(%id, "No directive line for value, dropped from export");
    }

    out
}

fn edit_line<'v>(
    line: &str,
    fields: &[TemplateField],
    values: &'v CustomizationValues,
) -> LineEdit<'v> {
    let Some(directive) = grammar::parse_loose(line) else {
        return LineEdit::NotDirective;
    };
    let Some((id, value)) = values.get_key_value(&directive.id.to_ascii_lowercase()) else {
        return LineEdit::NotDirective;
    };

    let field = fields.iter().find(|f| f.id == *id);
    // An untouched default leaves every line of that id as written, so
    // later duplicates keep their own values.
    if field.is_some_and(|f| f.default_value == *value) {
        return LineEdit::Unchanged(id.as_str());
    }

    let kind = field.map(|f| f.kind).or(directive.kind);
    let current = match kind {
        Some(kind) => normalize_value(kind, directive.value),
        None => directive.value.to_string(),
    };
    if current == *value {
        return LineEdit::Unchanged(id.as_str());
    }

    let indent = &line[..line.len() - line.trim_start().len()];
    LineEdit::Rewritten(id.as_str(), format!("{indent}{}", grammar::format(id, value)))
}

fn split_line_ending(segment: &str) -> (&str, &str) {
    if let Some(line) = segment.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = segment.strip_suffix('\n') {
        (line, "\n")
    } else {
        (segment, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract;

    const TEMPLATE: &str = "solid plate\n\
        # TEMPLATE_COLOR_main_color FF0000\n\
        # TEMPLATE_TEXT_custom_text Hello\n\
        facet normal 0 0 1\n\
        endsolid plate";

    fn values(pairs: &[(&str, &str)]) -> CustomizationValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_round_trip_byte_for_byte() {
        let t = extract(TEMPLATE, false);
        let out = export(&t.raw_text, &t.fields, &t.default_values());
        assert_eq!(out, TEMPLATE);
    }

    #[test]
    fn test_changed_value_rewrites_line() {
        let t = extract(TEMPLATE, false);
        let out = export(&t.raw_text, &t.fields, &values(&[("custom_text", "World")]));
        assert_eq!(
            out,
            "solid plate\n\
             # TEMPLATE_COLOR_main_color FF0000\n\
             # TEMPLATE_CUSTOM_TEXT_custom_text World\n\
             facet normal 0 0 1\n\
             endsolid plate"
        );
    }

    #[test]
    fn test_unmatched_value_is_dropped() {
        let t = extract(TEMPLATE, false);
        let out = export(&t.raw_text, &t.fields, &values(&[("nameplate_label", "ACME")]));
        assert_eq!(out, TEMPLATE);
    }

    #[test]
    fn test_export_is_idempotent() {
        let t = extract(TEMPLATE, false);
        let v = values(&[("main_color", "#123456"), ("custom_text", "X")]);
        let first = export(&t.raw_text, &t.fields, &v);
        let second = export(&t.raw_text, &t.fields, &v);
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_of_export_is_stable() {
        let t = extract(TEMPLATE, false);
        let v = values(&[("custom_text", "X")]);
        let once = export(&t.raw_text, &t.fields, &v);
        let twice = export(&once, &t.fields, &v);
        assert_eq!(once, twice);

        let changed = export(&once, &t.fields, &values(&[("custom_text", "Y")]));
        assert!(changed.contains("# TEMPLATE_CUSTOM_TEXT_custom_text Y\n"));
    }

    #[test]
    fn test_crlf_and_indent_preserved() {
        let raw = "solid x\r\n  # TEMPLATE_TEXT_title Hi\r\nendsolid x\r\n";
        let t = extract(raw, false);
        let out = export(raw, &t.fields, &values(&[("title", "Bye")]));
        assert_eq!(out, "solid x\r\n  # TEMPLATE_TITLE_title Bye\r\nendsolid x\r\n");
    }

    #[test]
    fn test_color_without_hash_matches_normalized_default() {
        let t = extract(TEMPLATE, false);
        assert_eq!(t.field("main_color").unwrap().default_value, "#FF0000");
        let out = export(&t.raw_text, &t.fields, &values(&[("main_color", "#FF0000")]));
        assert_eq!(out, TEMPLATE);
    }

    #[test]
    fn test_duplicate_ids_keep_their_own_values() {
        let raw = "solid x\n# TEMPLATE_TEXT_title Hello\n# TEMPLATE_TEXT_title World\nendsolid x\n";
        let t = extract(raw, false);
        assert_eq!(t.fields.len(), 1);
        assert_eq!(export(raw, &t.fields, &t.default_values()), raw);

        let out = export(raw, &t.fields, &values(&[("title", "Bye")]));
        assert_eq!(
            out,
            "solid x\n# TEMPLATE_TITLE_title Bye\n# TEMPLATE_TITLE_title Bye\nendsolid x\n"
        );
    }

    #[test]
    fn test_every_matching_line_is_rewritten() {
        let raw = "# TEMPLATE_TEXT_title A\nfoo\n# TEMPLATE_COLOR_title B\n";
        let out = export(raw, &[], &values(&[("title", "C")]));
        assert_eq!(out, "# TEMPLATE_TITLE_title C\nfoo\n# TEMPLATE_TITLE_title C\n");
    }

    #[test]
    fn test_artifact_packaging() {
        let t = extract(TEMPLATE, false);
        let artifact = ExportArtifact::build(&t, &t.default_values());
        assert_eq!(artifact.file_name, "customized.stl");
        assert_eq!(artifact.content_type, "model/stl");
        assert_eq!(artifact.bytes, TEMPLATE.as_bytes());
    }
}
