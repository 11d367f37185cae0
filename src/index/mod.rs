// Exact in-memory vector index over L2-normalized embeddings

pub mod snapshot;

#[cfg(test)]
mod tests;

use std::cmp::Ordering;

use tracing::debug;

use crate::{RagError, Result};

pub use snapshot::{Snapshot, SnapshotManifest, hash_document};

/// A search result: position of the stored vector and its cosine similarity to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub score: f32,
}

/// Brute-force cosine similarity index.
///
/// Vectors are stored normalized in one contiguous buffer, so a search is one dot
/// product per stored vector. Position `i` always refers to the `i`-th vector passed
/// to [`VectorIndex::build`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    values: Vec<f32>,
}

impl VectorIndex {
    /// Build an index from embeddings; all vectors must share one dimension
    #[inline]
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Ok(Self::default());
        };

        let dimension = first.len();
        if dimension == 0 {
            return Err(RagError::IndexCorruption(
                "cannot index zero-dimension vectors".to_string(),
            ));
        }

        let mut values = Vec::with_capacity(dimension * vectors.len());
        for vector in vectors {
            if vector.len() != dimension {
                return Err(RagError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            values.extend(normalized(&vector));
        }

        let index = Self { dimension, values };
        debug!(
            "Built vector index with {} vectors of dimension {}",
            index.len(),
            dimension
        );
        Ok(index)
    }

    /// Rebuild an index from an already normalized flat buffer
    pub(crate) fn from_normalized(dimension: usize, values: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            if values.is_empty() {
                return Ok(Self::default());
            }
            return Err(RagError::IndexCorruption(
                "vector data present with zero dimension".to_string(),
            ));
        }
        if values.len() % dimension != 0 {
            return Err(RagError::IndexCorruption(format!(
                "{} values do not divide into vectors of dimension {}",
                values.len(),
                dimension
            )));
        }
        Ok(Self { dimension, values })
    }

    /// Return the `k` stored vectors most similar to `query`, best first.
    ///
    /// Ties keep the lower position first. Searching an empty index always succeeds
    /// with no hits; otherwise a query of the wrong dimension is an error.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let query = normalized(query);
        let mut hits: Vec<SearchHit> = self
            .values
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, stored)| {
                let score = dot(stored, &query);
                SearchHit {
                    position,
                    score: if score.is_finite() {
                        score
                    } else {
                        f32::NEG_INFINITY
                    },
                }
            })
            .collect();

        hits.sort_by(compare_hits);
        hits.truncate(k);
        Ok(hits)
    }

    #[inline]
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.values.len() / self.dimension
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension, 0 for an empty index
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Stored (normalized) vector at `position`
    #[inline]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        self.values.chunks_exact(self.dimension.max(1)).nth(position)
    }

    pub(crate) fn values(&self) -> &[f32] {
        &self.values
    }
}

fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.position.cmp(&b.position))
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale `vector` to unit length; zero vectors stay zero
fn normalized(vector: &[f32]) -> Vec<f32> {
    let magnitude = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return vec![0.0; vector.len()];
    }
    vector.iter().map(|x| x / magnitude).collect()
}
