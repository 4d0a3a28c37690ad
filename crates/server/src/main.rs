use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

mod config;
mod fonts;
mod routes;

use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub client: reqwest::Client,
    pub setup_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
            setup_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let fonts = ServeDir::new(&state.config.font_dir);
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/setup", get(routes::setup))
        .route("/api/template/extract", post(routes::extract_template))
        .route("/api/template/export", post(routes::export_template))
        .nest_service("/fonts", fonts)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "font_server=info".into()),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(2);
        }
    };
    let addr = config.addr;
    tracing::info!(font_dir = %config.font_dir.display(), "Serving fonts");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Server running on http://{addr}");
    if let Err(e) = axum::serve(listener, app(AppState::new(config))).await {
        tracing::error!("Server error: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::tests::{font_source, temp_dir};
    use crate::fonts::FONT_FILE_NAME;

    /// Run the full router on a random port; returns its base URL
    async fn serve(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_setup_then_font_is_served() {
        let dir = temp_dir();
        let base = serve(AppState::new(ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            font_dir: dir.clone(),
            font_source_url: font_source(true).await,
        }))
        .await;
        let client = reqwest::Client::new();

        let font_url = format!("{base}/fonts/{FONT_FILE_NAME}");
        let before = client.get(&font_url).send().await.unwrap();
        assert_eq!(before.status(), reqwest::StatusCode::NOT_FOUND);

        let setup: serde_json::Value = client
            .get(format!("{base}/api/setup"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(setup["success"], true);

        let after = client.get(&font_url).send().await.unwrap();
        assert!(after.status().is_success());
        assert_eq!(after.text().await.unwrap(), fonts::tests::FONT_BODY);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
