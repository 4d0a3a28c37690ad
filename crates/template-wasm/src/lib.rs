//! Browser bindings for the template engine.
//!
//! Payloads cross the boundary as JSON strings; the exported model comes
//! back as raw bytes ready for a `Blob`.

use serde::Deserialize;
use stl_template::{
    demo_template, extract, load_model_file, CustomizationValues, ExportArtifact, TemplateError,
    EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME,
};
use wasm_bindgen::prelude::*;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

#[derive(Debug, Deserialize)]
struct ExportPayload {
    raw_text: String,
    #[serde(default)]
    values: CustomizationValues,
    #[serde(default)]
    use_defaults: bool,
}

fn extract_json(raw_text: &str, use_defaults: bool) -> Result<String, ApiError> {
    Ok(serde_json::to_string(&extract(raw_text, use_defaults))?)
}

fn load_file_json(file_name: &str, bytes: &[u8], use_defaults: bool) -> Result<String, ApiError> {
    let template = load_model_file(file_name, bytes, use_defaults)?;
    Ok(serde_json::to_string(&template)?)
}

fn export_bytes(payload_json: &str) -> Result<Vec<u8>, ApiError> {
    let payload: ExportPayload = serde_json::from_str(payload_json)?;
    let template = extract(&payload.raw_text, payload.use_defaults);
    let artifact = ExportArtifact::build(&template, &payload.values);
    tracing::info!(bytes = artifact.bytes.len(), "Exported template");
    Ok(artifact.bytes)
}

fn demo_json() -> Result<String, ApiError> {
    Ok(serde_json::to_string(&demo_template())?)
}

/// Fields of a model given as text, as `ParsedTemplate` JSON
#[wasm_bindgen]
pub fn extract_template(raw_text: &str, use_defaults: bool) -> Result<String, JsError> {
    Ok(extract_json(raw_text, use_defaults)?)
}

/// Check the file name, decode the bytes one char each and extract
#[wasm_bindgen]
pub fn load_model(file_name: &str, bytes: &[u8], use_defaults: bool) -> Result<String, JsError> {
    Ok(load_file_json(file_name, bytes, use_defaults)?)
}

/// `{raw_text, values, use_defaults}` JSON → bytes of `customized.stl`
#[wasm_bindgen]
pub fn export_template(payload_json: &str) -> Result<Vec<u8>, JsError> {
    Ok(export_bytes(payload_json)?)
}

/// The built-in nameplate as `ParsedTemplate` JSON
#[wasm_bindgen]
pub fn demo() -> Result<String, JsError> {
    Ok(demo_json()?)
}

#[wasm_bindgen]
pub fn export_file_name() -> String {
    EXPORT_FILE_NAME.to_string()
}

#[wasm_bindgen]
pub fn export_content_type() -> String {
    EXPORT_CONTENT_TYPE.to_string()
}
