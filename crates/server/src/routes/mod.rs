use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use stl_template::{
    extract, model_text::check_file_name, CustomizationValues, ExportArtifact, ParsedTemplate,
};

use crate::fonts;
use crate::AppState;

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Ensure the label typeface is present in the font directory
pub async fn setup(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    // One download at a time; later callers find the file in place
    let _guard = state.setup_lock.lock().await;
    match fonts::ensure_font_exists(
        &state.client,
        &state.config.font_dir,
        &state.config.font_source_url,
    )
    .await
    {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => {
            tracing::error!("Font setup error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Font setup failed" })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub raw_text: String,
    #[serde(default)]
    pub use_defaults: bool,
}

/// Raw model text → field list
pub async fn extract_template(Json(request): Json<ExtractRequest>) -> Json<ParsedTemplate> {
    let template = extract(&request.raw_text, request.use_defaults);
    tracing::debug!(fields = template.fields.len(), "Extracted template");
    Json(template)
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub raw_text: String,
    #[serde(default)]
    pub values: CustomizationValues,
    #[serde(default)]
    pub use_defaults: bool,
    /// Name of the uploaded file, checked like a local open
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Raw model text + values → downloadable `customized.stl`
pub async fn export_template(Json(request): Json<ExportRequest>) -> Response {
    if let Some(name) = &request.file_name {
        if let Err(e) = check_file_name(name) {
            tracing::warn!("Rejected export request: {e}");
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
                .into_response();
        }
    }

    let template = extract(&request.raw_text, request.use_defaults);
    let artifact = ExportArtifact::build(&template, &request.values);
    tracing::info!(bytes = artifact.bytes.len(), "Exported template");

    (
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
        ],
        artifact.bytes,
    )
        .into_response()
}
