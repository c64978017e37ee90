use taxdoc_gemini::GeminiClient;

use crate::error::RagError;
#[cfg(test)]
use crate::schema::EMBED_DIM;

/// Wrapper around the hosted embedding API used by the index store.
pub struct Embedder {
    client: Option<GeminiClient>,
}

impl Embedder {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Test-only: an embedder that returns zero vectors without any network.
    #[cfg(test)]
    pub(crate) fn fake() -> Self {
        Self { client: None }
    }

    /// Embed document chunks at ingest time.
    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let client = match &self.client {
            Some(c) => c,
            None => {
                #[cfg(test)]
                return Ok(texts
                    .iter()
                    .map(|_| vec![0.0f32; EMBED_DIM as usize])
                    .collect());
                #[cfg(not(test))]
                unreachable!("Embedder has no client; Embedder::fake() is test-only");
            }
        };
        client
            .embed_documents(texts)
            .await
            .map_err(|e| RagError::Embed(e.to_string()))
    }

    /// Embed a question at query time.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        let client = match &self.client {
            Some(c) => c,
            None => {
                #[cfg(test)]
                return Ok(vec![0.0f32; EMBED_DIM as usize]);
                #[cfg(not(test))]
                unreachable!("Embedder has no client; Embedder::fake() is test-only");
            }
        };
        client
            .embed_query(query)
            .await
            .map_err(|e| RagError::Embed(e.to_string()))
    }
}
