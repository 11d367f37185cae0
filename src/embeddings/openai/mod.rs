
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::RagError;
use crate::config::OpenAiEmbeddingConfig;
use crate::embeddings::{Embedder, check_embeddings};
use crate::http::{HttpClient, join_path};

/// Embedding client for OpenAI-compatible `/embeddings` endpoints
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    endpoint: Url,
    model: String,
    batch_size: u32,
    embedding_dimension: Option<usize>,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Create a client, reading the API key from the environment variable named in `config`
    #[inline]
    pub fn new(config: &OpenAiEmbeddingConfig) -> crate::Result<Self> {
        let endpoint = config
            .endpoint_url()
            .map_err(|e| RagError::Config(e.to_string()))?;
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            debug!(
                "No API key found in {}, sending unauthenticated requests",
                config.api_key_env
            );
        }

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            batch_size: config.batch_size.max(1),
            embedding_dimension: (config.embedding_dimension > 0)
                .then_some(config.embedding_dimension as usize),
            http: HttpClient::default().with_bearer_token(api_key),
        })
    }

    #[inline]
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    #[inline]
    pub fn has_api_key(&self) -> bool {
        self.http.has_bearer_token()
    }

    fn embed_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = join_path(&self.endpoint, "embeddings")?;
        let request = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let response_text = self
            .http
            .post_json(&url, &request)
            .context("Failed to generate embeddings")?;

        let mut response: EmbeddingsResponse =
            serde_json::from_str(&response_text).context("Failed to parse embeddings response")?;

        // Servers may return entries out of order; `index` is authoritative
        response.data.sort_by_key(|entry| entry.index);
        Ok(response.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

impl Embedder for OpenAiEmbedder {
    #[inline]
    fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    fn embed(&self, texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size as usize) {
            let vectors = self
                .embed_single_batch(batch)
                .map_err(|e| RagError::EmbeddingFailure(format!("{:#}", e)))?;
            check_embeddings(&vectors, batch.len(), self.embedding_dimension)?;
            results.extend(vectors);
        }

        debug!("Generated {} embeddings with {}", results.len(), self.model);
        Ok(results)
    }
}
