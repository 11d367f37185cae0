
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::{LexicalHit, rank_hits};
use crate::text::tokenize;

pub const DEFAULT_NGRAM_MAX: usize = 2;

type SparseVector = BTreeMap<String, f32>;

/// TF-IDF cosine search over blank-line separated passages
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfSearch {
    pub max_results: usize,
    /// Hits scoring below this are dropped
    pub min_score: f32,
    /// Longest word n-gram used as a term
    pub ngram_max: usize,
}

impl Default for TfidfSearch {
    #[inline]
    fn default() -> Self {
        Self {
            max_results: 3,
            min_score: 0.1,
            ngram_max: DEFAULT_NGRAM_MAX,
        }
    }
}

/// Passages of a document with their fitted TF-IDF vectors
#[derive(Debug, Clone, Default)]
pub struct TfidfCorpus {
    passages: Vec<String>,
    vectors: Vec<SparseVector>,
    idf: HashMap<String, f32>,
    ngram_max: usize,
}

impl TfidfCorpus {
    #[inline]
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    #[inline]
    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    #[inline]
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    fn vectorize(&self, text: &str) -> SparseVector {
        let mut vector = SparseVector::new();
        for term in terms(text, self.ngram_max) {
            if let Some(idf) = self.idf.get(&term) {
                *vector.entry(term).or_insert(0.0) += idf;
            }
        }
        l2_normalize(&mut vector);
        vector
    }
}

impl TfidfSearch {
    /// Split `document` on blank lines and fit IDF weights over the passages
    pub fn fit(&self, document: &str) -> TfidfCorpus {
        let passages: Vec<String> = document
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        let term_counts: Vec<HashMap<String, usize>> = passages
            .iter()
            .map(|passage| {
                let mut counts = HashMap::new();
                for term in terms(passage, self.ngram_max) {
                    *counts.entry(term).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for counts in &term_counts {
            for term in counts.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        // Smooth IDF: ln((1 + n) / (1 + df)) + 1
        let n = passages.len() as f32;
        let idf: HashMap<String, f32> = document_frequency
            .into_iter()
            .map(|(term, df)| {
                (
                    term.to_string(),
                    ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0,
                )
            })
            .collect();

        let vectors = term_counts
            .into_iter()
            .map(|counts| {
                let mut vector: SparseVector = counts
                    .into_iter()
                    .map(|(term, count)| {
                        let weight = count as f32 * idf.get(&term).copied().unwrap_or(0.0);
                        (term, weight)
                    })
                    .collect();
                l2_normalize(&mut vector);
                vector
            })
            .collect();

        debug!(
            "Fitted TF-IDF over {} passages ({} terms)",
            passages.len(),
            idf.len()
        );

        TfidfCorpus {
            passages,
            vectors,
            idf,
            ngram_max: self.ngram_max,
        }
    }

    /// Rank passages of `corpus` by cosine similarity to `query`
    pub fn search(&self, corpus: &TfidfCorpus, query: &str) -> Vec<LexicalHit> {
        if corpus.is_empty() || self.max_results == 0 {
            return Vec::new();
        }

        let query_vector = corpus.vectorize(query);
        if query_vector.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<LexicalHit> = corpus
            .vectors
            .iter()
            .zip(&corpus.passages)
            .enumerate()
            .filter_map(|(position, (vector, passage))| {
                let score = cosine(&query_vector, vector);
                (score > 0.0 && score >= self.min_score).then(|| LexicalHit {
                    text: passage.clone(),
                    score,
                    position,
                })
            })
            .collect();

        rank_hits(&mut hits, self.max_results);
        hits
    }

    /// Fit `document` and search it in one go
    #[inline]
    pub fn search_document(&self, document: &str, query: &str) -> Vec<LexicalHit> {
        self.search(&self.fit(document), query)
    }
}

/// Word n-grams of the tokenized text, from unigrams up to `ngram_max`
fn terms(text: &str, ngram_max: usize) -> Vec<String> {
    let tokens = tokenize(text);
    (1..=ngram_max.max(1))
        .flat_map(|n| tokens.windows(n).map(|window| window.join(" ")))
        .collect()
}

fn l2_normalize(vector: &mut SparseVector) {
    let norm = vector.values().map(|w| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for weight in vector.values_mut() {
            *weight /= norm;
        }
    }
}

fn cosine(query: &SparseVector, passage: &SparseVector) -> f32 {
    query
        .iter()
        .filter_map(|(term, weight)| passage.get(term).map(|w| w * weight))
        .sum()
}
