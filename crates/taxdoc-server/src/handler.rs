use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use taxdoc_core::{TEMPERATURE, TOP_K, build_prompt, format_context};
use taxdoc_gemini::{GeminiClient, GeminiError};
use taxdoc_rag::{Embedder, IndexStore, RagError, retrieve};

use crate::AppState;

#[derive(thiserror::Error, Debug)]
enum ChainError {
    #[error(transparent)]
    Rag(#[from] RagError),
    #[error(transparent)]
    Gemini(#[from] GeminiError),
}

/// `POST /api/query` — accepts `{"query": "<question>"}` and returns
/// `{"response": "<answer>"}`, or a structured error per the contract:
/// 500 when the credential is missing, 400 for bad input, 500 for any
/// failure in the retrieval/generation chain.
pub async fn query_handler(State(state): State<Arc<AppState>>, body: String) -> Response {
    let (status, payload) = respond(&state, &body).await;
    if status == StatusCode::OK {
        // Permissive CORS header on success responses only.
        (
            status,
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            ],
            axum::Json(payload),
        )
            .into_response()
    } else {
        (status, axum::Json(payload)).into_response()
    }
}

async fn respond(state: &AppState, body: &str) -> (StatusCode, Value) {
    let Some(client) = &state.client else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "GOOGLE_API_KEY not configured." }),
        );
    };

    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return (
            StatusCode::BAD_REQUEST,
            json!({ "error": "Invalid JSON body or missing 'query'." }),
        );
    };
    let query = parsed
        .get("query")
        .and_then(|q| q.as_str())
        .unwrap_or_default();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            json!({ "error": "Missing 'query' parameter." }),
        );
    }

    tracing::info!("executing RAG chain for query: {query}");
    match run_chain(state, client, query).await {
        Ok(answer) => (StatusCode::OK, json!({ "response": answer })),
        Err(e) => {
            tracing::error!("RAG chain failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Internal server error: {e}") }),
            )
        }
    }
}

/// Retrieve → prompt → generate, as one synchronous call chain.
async fn run_chain(
    state: &AppState,
    client: &GeminiClient,
    query: &str,
) -> Result<String, ChainError> {
    let index_path = state.config.index_dir.to_string_lossy();
    let store = IndexStore::open(&index_path, Embedder::new(client.clone())).await?;

    let chunks = retrieve(&store, query, TOP_K).await?;
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    let prompt = build_prompt(&format_context(&texts), query);

    let answer = client.generate(&prompt, TEMPERATURE).await?;
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use taxdoc_core::Config;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    const DIM: usize = 768;

    fn state_with_key(key: Option<&str>, index_dir: PathBuf) -> AppState {
        AppState::new(Config {
            api_key: key.map(str::to_string),
            data_dir: PathBuf::from("data"),
            index_dir,
        })
    }

    // ── Validation ladder (no network, no index) ─────────────────────────────

    #[tokio::test]
    async fn missing_credential_is_500_before_anything_else() {
        let state = state_with_key(None, PathBuf::from("unused"));
        // Body is valid; the credential check must still win.
        let (status, payload) = respond(&state, r#"{"query": "q"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(payload["error"], "GOOGLE_API_KEY not configured.");
    }

    #[tokio::test]
    async fn invalid_json_is_400() {
        let state = state_with_key(Some("k"), PathBuf::from("unused"));
        let (status, payload) = respond(&state, "not json {").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], "Invalid JSON body or missing 'query'.");
    }

    #[tokio::test]
    async fn missing_query_key_is_400() {
        let state = state_with_key(Some("k"), PathBuf::from("unused"));
        let (status, payload) = respond(&state, "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], "Missing 'query' parameter.");
    }

    #[tokio::test]
    async fn empty_query_is_400() {
        let state = state_with_key(Some("k"), PathBuf::from("unused"));
        let (status, _) = respond(&state, r#"{"query": ""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_string_query_is_400() {
        let state = state_with_key(Some("k"), PathBuf::from("unused"));
        let (status, _) = respond(&state, r#"{"query": 42}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ── Full chain against a mocked API ──────────────────────────────────────

    /// Responds to batchEmbedContents with one 768-dim vector per request.
    struct BatchEmbedResponder;

    impl Respond for BatchEmbedResponder {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            let count = body["requests"].as_array().map_or(0, |r| r.len());
            let embeddings: Vec<serde_json::Value> = (0..count)
                .map(|_| json!({ "values": vec![0.0f32; DIM] }))
                .collect();
            ResponseTemplate::new(200).set_body_json(json!({ "embeddings": embeddings }))
        }
    }

    async fn mock_gemini() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/models/{}:batchEmbedContents",
                taxdoc_gemini::EMBED_MODEL
            )))
            .respond_with(BatchEmbedResponder)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/models/{}:embedContent",
                taxdoc_gemini::EMBED_MODEL
            )))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "embedding": { "values": vec![0.0f32; DIM] } })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/models/{}:generateContent",
                taxdoc_gemini::CHAT_MODEL
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "The small profits rate is 19%." }]
                    }
                }]
            })))
            .mount(&server)
            .await;
        server
    }

    async fn build_index(server: &MockServer, index_dir: &std::path::Path) {
        let client = GeminiClient::with_base_url("k", server.uri());
        let store = IndexStore::open(
            index_dir.to_str().unwrap(),
            Embedder::new(client),
        )
        .await
        .unwrap();
        let records = vec![taxdoc_rag::ChunkRecord {
            chunk_id: "ct600-guide.pdf/0".to_string(),
            source_file: "ct600-guide.pdf".to_string(),
            chunk_idx: 0,
            text: "The small profits rate of corporation tax is 19%.".to_string(),
        }];
        taxdoc_rag::replace_chunks(&store, records).await.unwrap();
    }

    #[tokio::test]
    async fn valid_query_returns_200_with_response_text() {
        let server = mock_gemini().await;
        let dir = TempDir::new().unwrap();
        let index_dir = dir.path().join("index");
        build_index(&server, &index_dir).await;

        let mut state = state_with_key(Some("k"), index_dir);
        state.client = Some(GeminiClient::with_base_url("k", server.uri()));

        let (status, payload) = respond(
            &state,
            r#"{"query": "What is the small profits rate for corporation tax?"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response = payload["response"].as_str().unwrap();
        assert!(!response.is_empty());
        assert!(response.contains("19%"));
    }

    #[tokio::test]
    async fn chain_failure_is_500_with_message() {
        let server = MockServer::start().await;
        // No mocks mounted: the embed call 404s and the chain must fail.
        let dir = TempDir::new().unwrap();
        let mut state = state_with_key(Some("k"), dir.path().join("index"));
        state.client = Some(GeminiClient::with_base_url("k", server.uri()));

        let (status, payload) = respond(&state, r#"{"query": "q"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = payload["error"].as_str().unwrap();
        assert!(message.starts_with("Internal server error:"));
    }
}
