use crate::error::GeminiError;
use crate::types::{
    ApiErrorResponse, BatchEmbedContentsRequest, BatchEmbedContentsResponse, Content,
    EmbedContentRequest, EmbedContentResponse, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig,
};

/// Embedding model used at both ingest and query time. Retrieval is only
/// meaningful when the index was built with the same model.
pub const EMBED_MODEL: &str = "text-embedding-004";

/// Chat model used for answer generation.
pub const CHAT_MODEL: &str = "gemini-2.5-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The API rejects batchEmbedContents calls with more than 100 requests.
const EMBED_BATCH_LIMIT: usize = 100;

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different API root (used by tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Embed document chunks for indexing. Splits over the API's per-call
    /// request limit; the returned vectors are in input order.
    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, GeminiError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let url = format!(
            "{}/models/{}:batchEmbedContents",
            self.base_url, EMBED_MODEL
        );
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH_LIMIT) {
            let request = BatchEmbedContentsRequest {
                requests: batch
                    .iter()
                    .map(|text| EmbedContentRequest {
                        model: format!("models/{EMBED_MODEL}"),
                        content: Content::from_text(text.clone()),
                        task_type: Some("RETRIEVAL_DOCUMENT".to_string()),
                    })
                    .collect(),
            };
            let response: BatchEmbedContentsResponse = self.post(&url, &request).await?;
            if response.embeddings.len() != batch.len() {
                return Err(GeminiError::UnexpectedResponse(format!(
                    "requested {} embeddings, got {}",
                    batch.len(),
                    response.embeddings.len()
                )));
            }
            out.extend(response.embeddings.into_iter().map(|e| e.values));
        }
        Ok(out)
    }

    /// Embed a search query.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, GeminiError> {
        let url = format!("{}/models/{}:embedContent", self.base_url, EMBED_MODEL);
        let request = EmbedContentRequest {
            model: format!("models/{EMBED_MODEL}"),
            content: Content::from_text(query),
            task_type: Some("RETRIEVAL_QUERY".to_string()),
        };
        let response: EmbedContentResponse = self.post(&url, &request).await?;
        Ok(response.embedding.values)
    }

    /// Send a prompt to the chat model and return the plain-text completion.
    pub async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GeminiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, CHAT_MODEL);
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: GenerationConfig { temperature },
        };
        let response: GenerateContentResponse = self.post(&url, &request).await?;
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        if text.is_empty() {
            return Err(GeminiError::UnexpectedResponse(
                "no candidates in generateContent response".to_string(),
            ));
        }
        Ok(text)
    }

    async fn post<Req, Resp>(&self, url: &str, body: &Req) -> Result<Resp, GeminiError>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response.json::<Resp>().await.map_err(Into::into)
    }
}
