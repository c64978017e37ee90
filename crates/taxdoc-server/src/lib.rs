pub mod handler;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use taxdoc_core::Config;
use taxdoc_gemini::GeminiClient;

pub use handler::query_handler;

/// Shared state for the query endpoint. The Gemini client is built once at
/// startup and reused across requests; the index is opened per request so a
/// re-ingestion is picked up without a restart.
pub struct AppState {
    pub config: Config,
    pub client: Option<GeminiClient>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let client = config.api_key.as_ref().map(GeminiClient::new);
        Self { config, client }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/query", post(query_handler))
        .with_state(state)
}

async fn health_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// Bind and serve the query endpoint until the process is stopped.
pub async fn serve(
    state: Arc<AppState>,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("taxdoc listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
