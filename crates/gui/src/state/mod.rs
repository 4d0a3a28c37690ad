pub mod settings;

use std::path::PathBuf;

use stl_template::{
    demo_template, load_model_file, CustomizationStore, ExportArtifact, ParsedTemplate,
    TemplateError, DEMO_FILE_NAME,
};

pub use settings::AppSettings;

/// Where the current template came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Demo,
    File {
        name: String,
        path: Option<PathBuf>,
    },
}

impl ModelSource {
    pub fn display_name(&self) -> &str {
        match self {
            ModelSource::Demo => DEMO_FILE_NAME,
            ModelSource::File { name, .. } => name,
        }
    }
}

/// The loaded template and where it came from
#[derive(Debug, Clone)]
pub struct Document {
    pub source: ModelSource,
    pub template: ParsedTemplate,
}

/// Combined application state
pub struct AppState {
    pub settings: AppSettings,
    pub document: Option<Document>,
    /// Current form values, seeded from the document on every load
    pub store: CustomizationStore,
    /// Incremented on every successful load
    pub document_version: u64,
    /// Message for the status bar (last error or action)
    pub status_message: Option<String>,
    /// Show settings window
    pub show_settings_window: bool,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            document: None,
            store: CustomizationStore::new(),
            document_version: 0,
            status_message: None,
            show_settings_window: false,
        }
    }

    /// Load the built-in demo nameplate
    pub fn open_demo(&mut self) {
        self.replace_document(ModelSource::Demo, demo_template());
    }

    /// Load a model file. On error nothing changes and the message is kept
    /// for the status bar.
    pub fn open_file(
        &mut self,
        name: &str,
        path: Option<PathBuf>,
        bytes: &[u8],
    ) -> Result<(), TemplateError> {
        match load_model_file(name, bytes, false) {
            Ok(template) => {
                let source = ModelSource::File {
                    name: name.to_string(),
                    path,
                };
                self.replace_document(source, template);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Rejected model file: {e}");
                self.status_message = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn replace_document(&mut self, source: ModelSource, template: ParsedTemplate) {
        tracing::info!(
            source = source.display_name(),
            fields = template.fields.len(),
            "Template loaded"
        );
        self.store.seed(&template);
        self.status_message = Some(format!(
            "Loaded {} ({} fields)",
            source.display_name(),
            template.fields.len()
        ));
        self.document = Some(Document { source, template });
        self.document_version += 1;
    }

    pub fn template(&self) -> Option<&ParsedTemplate> {
        self.document.as_ref().map(|d| &d.template)
    }

    /// Update one form value
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        self.store.set(id, value)
    }

    /// Export the current document with the current values
    pub fn export(&self) -> Option<ExportArtifact> {
        let template = self.template()?;
        Some(ExportArtifact::build(template, &self.store.snapshot()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(AppSettings::default())
    }

    #[test]
    fn test_open_demo_seeds_store() {
        let mut s = state();
        s.open_demo();
        assert_eq!(s.document_version, 1);
        assert_eq!(s.store.get("nameplate_label"), Some("BADGER"));
        assert_eq!(s.document.as_ref().unwrap().source, ModelSource::Demo);
    }

    #[test]
    fn test_rejected_file_keeps_document() {
        let mut s = state();
        s.open_demo();
        s.set_value("nameplate_label", "ACME");

        let err = s.open_file("plate.obj", None, b"solid x\n").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidFileType { .. }));
        assert_eq!(s.document_version, 1);
        assert_eq!(s.store.get("nameplate_label"), Some("ACME"));
        assert_eq!(s.status_message.as_deref(), Some("'plate.obj' is not an STL file"));
    }

    #[test]
    fn test_reload_replaces_values_wholesale() {
        let mut s = state();
        s.open_demo();
        s.set_value("nameplate_label", "ACME");
        s.open_file("tag.stl", None, b"solid tag\n# TEMPLATE_TEXT_title Hello\nendsolid tag\n")
            .unwrap();
        assert_eq!(s.store.get("title"), Some("Hello"));
        assert_eq!(s.store.get("nameplate_label"), None);
    }

    #[test]
    fn test_export_without_document() {
        assert!(state().export().is_none());
    }
}
