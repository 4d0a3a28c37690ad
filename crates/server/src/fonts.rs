//! Download-if-missing for the label typeface

use std::path::{Path, PathBuf};

pub const FONT_FILE_NAME: &str = "helvetiker_regular.typeface.json";

#[derive(Debug, thiserror::Error)]
pub enum FontSetupError {
    #[error("font directory error: {0}")]
    Io(#[from] std::io::Error),
    #[error("font download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("font download returned HTTP {0}")]
    Status(u16),
}

/// Make sure `<font_dir>/helvetiker_regular.typeface.json` exists,
/// downloading it from `source_url` when it does not. Returns its path.
///
/// The body is written to a temporary file first, so a failed download
/// never leaves a partial typeface behind.
pub async fn ensure_font_exists(
    client: &reqwest::Client,
    font_dir: &Path,
    source_url: &str,
) -> Result<PathBuf, FontSetupError> {
    tokio::fs::create_dir_all(font_dir).await?;
    let font_path = font_dir.join(FONT_FILE_NAME);
    if tokio::fs::try_exists(&font_path).await? {
        return Ok(font_path);
    }

    tracing::info!(url = source_url, "Downloading typeface to {}", font_path.display());
    let response = client.get(source_url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FontSetupError::Status(status.as_u16()));
    }
    let body = response.bytes().await?;

    let partial = font_dir.join(format!("{FONT_FILE_NAME}.{}.part", uuid::Uuid::new_v4()));
    if let Err(e) = write_then_rename(&partial, &font_path, &body).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    tracing::info!(bytes = body.len(), "Typeface saved");
    Ok(font_path)
}

async fn write_then_rename(partial: &Path, target: &Path, body: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(partial, body).await?;
    tokio::fs::rename(partial, target).await
}
