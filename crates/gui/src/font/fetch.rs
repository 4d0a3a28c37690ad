//! Background font download.
//!
//! The UI thread files a [`FontRequest`] and polls for [`FontResult`]s once
//! per frame. Each result carries the id of the scene that asked for it so
//! the scene manager can drop answers meant for a scene that no longer
//! exists.

use serde::Deserialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use super::{FontError, Typeface};

/// Where to get the label font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRequest {
    /// Scene that will receive the font
    pub scene_id: Uuid,
    /// Endpoint that makes sure the font file exists; skipped when `None`
    pub setup_url: Option<String>,
    pub typeface_url: String,
}

#[derive(Debug)]
pub struct FontResult {
    pub scene_id: Uuid,
    pub result: Result<Typeface, FontError>,
}

/// Body returned by the font setup endpoint
#[derive(Debug, Deserialize)]
struct SetupResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct FontFetcher {
    runtime: Option<tokio::runtime::Runtime>,
    client: reqwest::Client,
    tx: UnboundedSender<FontResult>,
    rx: UnboundedReceiver<FontResult>,
}

impl FontFetcher {
    pub fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("font-fetch")
            .enable_all()
            .build()
            .map_err(|e| tracing::warn!("Font fetching disabled, no async runtime: {e}"))
            .ok();
        let (tx, rx) = unbounded_channel();
        Self {
            runtime,
            client: reqwest::Client::new(),
            tx,
            rx,
        }
    }

    /// Start fetching in the background. Failures arrive through [`poll`].
    ///
    /// [`poll`]: FontFetcher::poll
    pub fn request(&self, request: FontRequest) {
        tracing::info!(scene_id = %request.scene_id, url = %request.typeface_url, "Fetching label font");
        let tx = self.tx.clone();

        let Some(runtime) = &self.runtime else {
            let _ = tx.send(FontResult {
                scene_id: request.scene_id,
                result: Err(FontError::Network("no async runtime".to_string())),
            });
            return;
        };

        let client = self.client.clone();
        runtime.spawn(async move {
            let result = fetch_typeface(&client, &request).await;
            // The receiver only disappears when the app shuts down
            let _ = tx.send(FontResult {
                scene_id: request.scene_id,
                result,
            });
        });
    }

    /// Results that arrived since the last call
    pub fn poll(&mut self) -> Vec<FontResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            results.push(result);
        }
        results
    }
}

impl Default for FontFetcher {
    fn default() -> Self {
        Self::new()
    }
}

async fn fetch_typeface(
    client: &reqwest::Client,
    request: &FontRequest,
) -> Result<Typeface, FontError> {
    if let Some(setup_url) = &request.setup_url {
        run_setup(client, setup_url).await?;
    }

    let response = client
        .get(&request.typeface_url)
        .send()
        .await
        .map_err(|e| FontError::Network(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FontError::Status {
            url: request.typeface_url.clone(),
            status: status.as_u16(),
        });
    }
    let body = response
        .text()
        .await
        .map_err(|e| FontError::Network(e.to_string()))?;
    Typeface::from_json(&body)
}

async fn run_setup(client: &reqwest::Client, setup_url: &str) -> Result<(), FontError> {
    let response = client
        .get(setup_url)
        .send()
        .await
        .map_err(|e| FontError::Network(e.to_string()))?;
    let status = response.status();
    let body: SetupResponse = response
        .json()
        .await
        .map_err(|e| FontError::SetupFailed(format!("HTTP {status}: {e}")))?;
    check_setup(body)
}

fn check_setup(body: SetupResponse) -> Result<(), FontError> {
    if body.success {
        Ok(())
    } else {
        Err(FontError::SetupFailed(
            body.error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_body() {
        let ok: SetupResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(check_setup(ok).is_ok());

        let failed: SetupResponse =
            serde_json::from_str(r#"{"success": false, "error": "Font setup failed"}"#).unwrap();
        assert_eq!(
            check_setup(failed),
            Err(FontError::SetupFailed("Font setup failed".to_string()))
        );
    }

    #[test]
    fn test_unreachable_server_reports_error() {
        let mut fetcher = FontFetcher::new();
        let scene_id = Uuid::new_v4();
        fetcher.request(FontRequest {
            scene_id,
            setup_url: None,
            // Port 9 (discard) on localhost is closed on test machines
            typeface_url: "http://127.0.0.1:9/font.json".to_string(),
        });

        let mut results = Vec::new();
        for _ in 0..200 {
            results = fetcher.poll();
            if !results.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(25));
        }
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].scene_id, scene_id);
        assert!(matches!(results[0].result, Err(FontError::Network(_))));
    }
}
