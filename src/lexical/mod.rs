// Lexical fallback search over the raw knowledge document

pub mod boost;
pub mod keyword;
pub mod tfidf;

#[cfg(test)]
mod tests;

use serde::Serialize;

pub use boost::{BoostRule, BoostRules};
pub use keyword::{EXACT_PHRASE_BONUS, KeywordMode, KeywordSearch};
pub use tfidf::{TfidfCorpus, TfidfSearch};

/// A passage matched by a lexical search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexicalHit {
    /// The matched line or paragraph, trimmed
    pub text: String,
    pub score: f32,
    /// Line or paragraph number in the source document
    pub position: usize,
}

/// Best hits first, ties in document order
pub(crate) fn rank_hits(hits: &mut Vec<LexicalHit>, max_results: usize) {
    hits.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.position.cmp(&b.position))
    });
    hits.truncate(max_results);
}

/// The knowledge document prepared for both lexical strategies
#[derive(Debug, Clone)]
pub struct LexicalCorpus {
    document: String,
    tfidf: TfidfCorpus,
}

impl LexicalCorpus {
    #[inline]
    pub fn new(document: String, tfidf: &TfidfSearch) -> Self {
        let corpus = tfidf.fit(&document);
        Self {
            document,
            tfidf: corpus,
        }
    }

    #[inline]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[inline]
    pub fn tfidf(&self) -> &TfidfCorpus {
        &self.tfidf
    }
}
