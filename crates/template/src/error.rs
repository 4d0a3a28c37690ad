use thiserror::Error;

/// Errors raised before a model file is handed to the extractor.
///
/// Malformed directive lines are never errors: they stay ordinary content.
/// An export value with no matching directive line is silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The file extension is not a supported model format
    #[error("'{file_name}' is not an STL file")]
    InvalidFileType { file_name: String },
}
