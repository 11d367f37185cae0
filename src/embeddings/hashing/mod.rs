#[cfg(test)]
mod tests;

use sha2::{Digest, Sha256};

use super::Embedder;
use crate::Result;
use crate::text::tokenize;

/// Deterministic bag-of-words embedder that needs no model server.
///
/// Each normalized token is hashed with SHA-256 into one of `dimension` buckets, so
/// vectors stay identical across builds and snapshots remain reusable. Texts sharing
/// words get similar vectors, which is enough to exercise the retrieval pipeline
/// offline.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model: String,
}

impl Default for HashingEmbedder {
    #[inline]
    fn default() -> Self {
        Self::new(256)
    }
}

impl HashingEmbedder {
    #[inline]
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model: format!("hashing-bow-{dimension}"),
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension];
        for token in tokenize(text) {
            vector[bucket_of(&token, self.dimension)] += 1.0;
        }
        vector
    }
}

/// Bucket for `token`: the first eight bytes of its SHA-256 digest, modulo `dimension`
fn bucket_of(token: &str, dimension: usize) -> usize {
    let digest = Sha256::digest(token.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_le_bytes(prefix) % dimension as u64) as usize
}

impl Embedder for HashingEmbedder {
    #[inline]
    fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
