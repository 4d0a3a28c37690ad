//! Templated STL files: directive grammar, field extraction, live
//! customization values and byte-preserving export.
//!
//! A template is an ordinary STL file whose header carries comment lines
//! such as `# TEMPLATE_COLOR_nameplate_background #FFA500`. Everything in
//! this crate is pure and synchronous; callers hand in the file bytes and
//! get the rewritten bytes back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub mod demo;
pub mod error;
pub mod export;
pub mod extract;
pub mod grammar;
pub mod model_text;
pub mod store;

pub use demo::{demo_template, DEMO_FILE_NAME, DEMO_STL};
pub use error::TemplateError;
pub use export::{export, ExportArtifact, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME};
pub use extract::{extract, fallback_fields};
pub use model_text::load_model_file;
pub use store::{CustomizationStore, ObserverId, StoreEvent};

/// Field identifier, unique within one template (always lowercase)
pub type FieldId = String;

/// Current customization values keyed by field id
pub type CustomizationValues = HashMap<FieldId, String>;

/// Kind of a customizable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Color,
    Text,
}

impl FieldKind {
    /// Keyword used inside a directive token (`COLOR`, `TEXT`)
    pub fn keyword(&self) -> &'static str {
        match self {
            FieldKind::Color => "COLOR",
            FieldKind::Text => "TEXT",
        }
    }
}

/// A customizable unit discovered in a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    pub id: FieldId,
    pub kind: FieldKind,
    /// Display name derived from the id
    pub label: String,
    /// For colors always `#`-prefixed
    pub default_value: String,
}

impl TemplateField {
    pub fn new(id: &str, kind: FieldKind, label: &str, default_value: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            label: label.to_string(),
            default_value: default_value.to_string(),
        }
    }
}

/// Result of extracting one model file. Replaced wholesale on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTemplate {
    /// Ordered by first appearance in the source (fallback set: fixed order)
    pub fields: Vec<TemplateField>,
    /// Complete, unmodified source text
    pub raw_text: String,
}

impl ParsedTemplate {
    /// Look up a field by id
    pub fn field(&self, id: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Default values of every field, as used to seed the form
    pub fn default_values(&self) -> CustomizationValues {
        self.fields
            .iter()
            .filter(|f| !f.default_value.is_empty())
            .map(|f| (f.id.clone(), f.default_value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_serde_lowercase() {
        let json = serde_json::to_string(&FieldKind::Color).unwrap();
        assert_eq!(json, "\"color\"");
        let kind: FieldKind = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(kind, FieldKind::Text);
    }

    #[test]
    fn test_parsed_template_json_shape() {
        let template = ParsedTemplate {
            fields: vec![TemplateField::new("title", FieldKind::Text, "title", "Hi")],
            raw_text: "solid x\n".to_string(),
        };
        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(value["fields"][0]["kind"], "text");
        assert_eq!(value["fields"][0]["default_value"], "Hi");
        assert_eq!(value["raw_text"], "solid x\n");
    }

    #[test]
    fn test_default_values_skip_empty() {
        let template = ParsedTemplate {
            fields: vec![
                TemplateField::new("a", FieldKind::Text, "a", "x"),
                TemplateField::new("b", FieldKind::Text, "b", ""),
            ],
            raw_text: String::new(),
        };
        let values = template.default_values();
        assert_eq!(values.len(), 1);
        assert_eq!(values["a"], "x");
    }
}
