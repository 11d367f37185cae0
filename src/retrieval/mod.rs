// Knowledge base construction and vector retrieval

#[cfg(test)]
mod tests;

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info};

use crate::embeddings::{Chunk, ChunkingConfig, Embedder, chunk_document};
use crate::index::{Snapshot, VectorIndex, hash_document};
use crate::{RagError, Result};

/// Texts sent to the embedder per call while building
const BUILD_BATCH_SIZE: usize = 32;

/// A retrieved chunk with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Immutable chunks of a knowledge document with their embeddings
#[derive(Debug)]
pub struct KnowledgeBase {
    chunks: Vec<Chunk>,
    index: VectorIndex,
    source_hash: String,
    embedding_model: String,
    max_chunk_size: usize,
}

impl KnowledgeBase {
    /// Chunk, embed and index `document`
    #[inline]
    pub fn build(
        document: &str,
        chunking: &ChunkingConfig,
        embedder: &dyn Embedder,
    ) -> Result<Self> {
        Self::build_with_progress(document, chunking, embedder, |_, _| {})
    }

    /// Like [`KnowledgeBase::build`], reporting `(embedded, total)` chunk counts as it goes
    pub fn build_with_progress<F>(
        document: &str,
        chunking: &ChunkingConfig,
        embedder: &dyn Embedder,
        mut on_progress: F,
    ) -> Result<Self>
    where
        F: FnMut(usize, usize),
    {
        let chunks = chunk_document(document, chunking);
        let total = chunks.len();
        info!(
            "Building knowledge base: {} chunks with model {}",
            total,
            embedder.model()
        );

        let mut vectors = Vec::with_capacity(total);
        on_progress(0, total);
        for batch in chunks.chunks(BUILD_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = embedder.embed(&texts)?;
            if embeddings.len() != texts.len() {
                return Err(RagError::EmbeddingFailure(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    embeddings.len()
                )));
            }
            vectors.extend(embeddings);
            on_progress(vectors.len(), total);
        }

        let index = VectorIndex::build(vectors)?;

        Ok(Self {
            chunks,
            index,
            source_hash: hash_document(document),
            embedding_model: embedder.model().to_string(),
            max_chunk_size: chunking.max_chunk_size,
        })
    }

    #[inline]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let Snapshot { manifest, index } = snapshot;
        Self {
            chunks: manifest.chunks,
            index,
            source_hash: manifest.source_hash,
            embedding_model: manifest.embedding_model,
            max_chunk_size: manifest.max_chunk_size,
        }
    }

    #[inline]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.chunks.clone(),
            self.index.clone(),
            self.source_hash.clone(),
            self.embedding_model.clone(),
            self.max_chunk_size,
        )
    }

    /// Vector search with an already embedded query
    pub fn search(
        &self,
        query_vector: &[f32],
        k: usize,
        min_score: Option<f32>,
    ) -> Result<Vec<ScoredChunk>> {
        let hits = self.index.search(query_vector, k)?;
        Ok(hits
            .into_iter()
            .filter(|hit| min_score.is_none_or(|min| hit.score >= min))
            .filter_map(|hit| {
                self.chunks.get(hit.position).map(|chunk| ScoredChunk {
                    chunk: chunk.clone(),
                    score: hit.score,
                })
            })
            .collect())
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[inline]
    pub fn source_hash(&self) -> &str {
        &self.source_hash
    }

    #[inline]
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Chunk size limit the document was split with
    #[inline]
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Embeds queries and searches whichever knowledge base is currently installed
pub struct Retriever<E: Embedder> {
    embedder: E,
    knowledge: RwLock<Option<Arc<KnowledgeBase>>>,
    min_score: Option<f32>,
}

impl<E: Embedder> Retriever<E> {
    #[inline]
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            knowledge: RwLock::new(None),
            min_score: None,
        }
    }

    #[inline]
    pub fn with_min_score(mut self, min_score: Option<f32>) -> Self {
        self.min_score = min_score;
        self
    }

    #[inline]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Replace the active knowledge base; in-flight searches keep the one they started with
    #[inline]
    pub fn install(&self, knowledge: Arc<KnowledgeBase>) {
        let mut guard = self
            .knowledge
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(knowledge);
    }

    #[inline]
    pub fn clear(&self) {
        let mut guard = self
            .knowledge
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    #[inline]
    pub fn current(&self) -> Option<Arc<KnowledgeBase>> {
        self.knowledge
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Return the `k` chunks most similar to `query`
    #[inline]
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if query.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }
        let knowledge = self.current().ok_or(RagError::IndexNotReady)?;
        self.retrieve_from(&knowledge, query, k)
    }

    /// Retrieve against a specific knowledge base rather than the installed one
    pub fn retrieve_from(
        &self,
        knowledge: &KnowledgeBase,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if query.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }
        if knowledge.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_query(query)?;
        let results = knowledge.search(&query_vector, k, self.min_score)?;
        debug!("Retrieved {} chunks for {:?}", results.len(), query);
        Ok(results)
    }
}
