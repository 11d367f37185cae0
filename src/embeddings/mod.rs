// Embeddings module
// Document chunking and the clients that turn chunks and queries into vectors

pub mod chunking;
pub mod hashing;
pub mod ollama;
pub mod openai;

#[cfg(test)]
mod tests;

use crate::{RagError, Result};

pub use chunking::{Chunk, ChunkKind, ChunkingConfig, chunk_document, estimate_token_count};
pub use hashing::HashingEmbedder;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;

/// Maps text to fixed-length vectors using an external embedding model.
///
/// Output is index-aligned with the input: `embed(texts)[i]` is the vector for `texts[i]`.
pub trait Embedder: Send + Sync {
    /// Name of the model producing the vectors, recorded in snapshots
    fn model(&self) -> &str;

    /// Embed a batch of texts
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query string
    #[inline]
    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .pop()
            .ok_or_else(|| RagError::EmbeddingFailure("Empty response for query".to_string()))
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    #[inline]
    fn model(&self) -> &str {
        (**self).model()
    }

    #[inline]
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        (**self).embed(texts)
    }

    #[inline]
    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed_query(text)
    }
}

/// Check a batch response against the request before handing it to callers
pub(crate) fn check_embeddings(
    vectors: &[Vec<f32>],
    expected_count: usize,
    expected_dimension: Option<usize>,
) -> Result<()> {
    if vectors.len() != expected_count {
        return Err(RagError::EmbeddingFailure(format!(
            "Mismatch between request and response counts: {} vs {}",
            expected_count,
            vectors.len()
        )));
    }

    if let Some(dimension) = expected_dimension {
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(RagError::EmbeddingFailure(format!(
                "Model returned {} dimensions, expected {}",
                bad.len(),
                dimension
            )));
        }
    }

    Ok(())
}
