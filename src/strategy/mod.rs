// Ordered fallback across retrieval strategies


use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::Passage;
use crate::embeddings::Embedder;
use crate::lexical::{KeywordSearch, LexicalCorpus, LexicalHit, TfidfSearch};
use crate::retrieval::{Retriever, ScoredChunk};
use crate::{RagError, Result};

/// A passage found by any strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub score: f32,
    /// Section title, known only for vector results
    pub section: Option<String>,
}

impl From<ScoredChunk> for RetrievedPassage {
    #[inline]
    fn from(scored: ScoredChunk) -> Self {
        Self {
            text: scored.chunk.text,
            score: scored.score,
            section: scored.chunk.section,
        }
    }
}

impl From<LexicalHit> for RetrievedPassage {
    #[inline]
    fn from(hit: LexicalHit) -> Self {
        Self {
            text: hit.text,
            score: hit.score,
            section: None,
        }
    }
}

impl Passage for RetrievedPassage {
    #[inline]
    fn passage_text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    Found(Vec<RetrievedPassage>),
    NoResult,
}

impl StrategyOutcome {
    fn from_passages<T: Into<RetrievedPassage>>(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::NoResult
        } else {
            Self::Found(items.into_iter().map(Into::into).collect())
        }
    }
}

/// One way of finding passages for a query
pub trait SearchStrategy {
    /// Short name reported alongside results
    fn name(&self) -> &'static str;

    fn search(&self, query: &str, k: usize) -> Result<StrategyOutcome>;
}

/// Embedding similarity against the installed knowledge base
pub struct VectorStrategy<'a, E: Embedder> {
    retriever: &'a Retriever<E>,
}

impl<'a, E: Embedder> VectorStrategy<'a, E> {
    #[inline]
    pub fn new(retriever: &'a Retriever<E>) -> Self {
        Self { retriever }
    }
}

impl<E: Embedder> SearchStrategy for VectorStrategy<'_, E> {
    fn name(&self) -> &'static str {
        "vector"
    }

    fn search(&self, query: &str, k: usize) -> Result<StrategyOutcome> {
        self.retriever
            .retrieve(query, k)
            .map(StrategyOutcome::from_passages)
    }
}

/// TF-IDF cosine over document paragraphs
pub struct TfidfStrategy<'a> {
    corpus: Option<&'a LexicalCorpus>,
    search: &'a TfidfSearch,
}

impl<'a> TfidfStrategy<'a> {
    #[inline]
    pub fn new(corpus: Option<&'a LexicalCorpus>, search: &'a TfidfSearch) -> Self {
        Self { corpus, search }
    }
}

impl SearchStrategy for TfidfStrategy<'_> {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn search(&self, query: &str, _k: usize) -> Result<StrategyOutcome> {
        let corpus = self.corpus.ok_or(RagError::IndexNotReady)?;
        Ok(StrategyOutcome::from_passages(
            self.search.search(corpus.tfidf(), query),
        ))
    }
}

/// Keyword matching over document lines
pub struct KeywordStrategy<'a> {
    corpus: Option<&'a LexicalCorpus>,
    search: &'a KeywordSearch,
}

impl<'a> KeywordStrategy<'a> {
    #[inline]
    pub fn new(corpus: Option<&'a LexicalCorpus>, search: &'a KeywordSearch) -> Self {
        Self { corpus, search }
    }
}

impl SearchStrategy for KeywordStrategy<'_> {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn search(&self, query: &str, _k: usize) -> Result<StrategyOutcome> {
        let corpus = self.corpus.ok_or(RagError::IndexNotReady)?;
        Ok(StrategyOutcome::from_passages(
            self.search.search(corpus.document(), query),
        ))
    }
}

/// Passages from the first strategy that found any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainOutcome {
    pub strategy: &'static str,
    pub passages: Vec<RetrievedPassage>,
}

/// Strategies tried in order until one finds something.
///
/// Recoverable errors and empty results move on to the next strategy. An empty
/// query stops the chain before any strategy runs, and any other error is returned.
#[derive(Default)]
pub struct FallbackChain<'a> {
    strategies: Vec<Box<dyn SearchStrategy + 'a>>,
}

impl<'a> FallbackChain<'a> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with<S: SearchStrategy + 'a>(mut self, strategy: S) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    #[inline]
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, query: &str, k: usize) -> Result<Option<ChainOutcome>> {
        if query.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }

        for strategy in &self.strategies {
            match strategy.search(query, k) {
                Ok(StrategyOutcome::Found(passages)) if !passages.is_empty() => {
                    info!(
                        "Strategy '{}' found {} passages",
                        strategy.name(),
                        passages.len()
                    );
                    return Ok(Some(ChainOutcome {
                        strategy: strategy.name(),
                        passages,
                    }));
                }
                Ok(_) => debug!("Strategy '{}' found nothing", strategy.name()),
                Err(e) if e.is_recoverable() => {
                    warn!("Strategy '{}' unavailable: {}", strategy.name(), e);
                }
                Err(e) => return Err(e),
            }
        }

        debug!("No strategy found passages for {:?}", query);
        Ok(None)
    }
}
