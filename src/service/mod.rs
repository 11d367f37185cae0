// Knowledge service: owns the knowledge base lifecycle and answers questions


use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Config, EmbeddingProvider};
use crate::context::{AssembleOptions, ContextStyle, assemble};
use crate::embeddings::{Embedder, OllamaEmbedder, OpenAiEmbedder};
use crate::index::{Snapshot, hash_document};
use crate::lexical::{BoostRules, KeywordMode, KeywordSearch, LexicalCorpus, TfidfSearch};
use crate::llm::{
    ChatModel, NO_INFORMATION_MESSAGE, OpenAiChatClient, SYSTEM_PROMPT, build_user_prompt,
    fallback_answer,
};
use crate::retrieval::{KnowledgeBase, Retriever, ScoredChunk};
use crate::strategy::{
    ChainOutcome, FallbackChain, KeywordStrategy, RetrievedPassage, TfidfStrategy, VectorStrategy,
};
use crate::{RagError, Result};

/// Context returned when the vector index has nothing relevant
pub const NO_RELEVANT_CONTEXT: &str = "Nema relevantnih informacija u bazi znanja.";

/// How `init` obtained the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InitOutcome {
    LoadedSnapshot,
    Rebuilt,
}

/// Reply to a user question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    /// Strategy that supplied the context, `None` when nothing was found
    pub strategy: Option<&'static str>,
    pub sources: Vec<RetrievedPassage>,
    /// Whether the text came from the chat model rather than the offline fallback
    pub generated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub knowledge_path: PathBuf,
    pub snapshot_dir: PathBuf,
    pub vector_ready: bool,
    pub lexical_ready: bool,
    pub chunk_count: usize,
    pub dimension: usize,
    pub embedding_model: String,
    pub source_hash: Option<String>,
    pub chat_model: Option<String>,
}

pub struct KnowledgeService {
    config: Config,
    retriever: Retriever<Box<dyn Embedder>>,
    lexical: RwLock<Option<Arc<LexicalCorpus>>>,
    chat: Option<Box<dyn ChatModel>>,
    keyword: KeywordSearch,
    tfidf: TfidfSearch,
}

impl KnowledgeService {
    #[inline]
    pub fn new(
        config: Config,
        embedder: Box<dyn Embedder>,
        chat: Option<Box<dyn ChatModel>>,
    ) -> Self {
        let retrieval = &config.retrieval;
        let keyword = KeywordSearch::new(KeywordMode::Scored, retrieval.keyword_max_results)
            .with_rules(BoostRules::from_config(&retrieval.boost_rules));
        let tfidf = TfidfSearch {
            max_results: retrieval.tfidf_max_results,
            min_score: retrieval.tfidf_min_score,
            ..TfidfSearch::default()
        };
        let retriever = Retriever::new(embedder).with_min_score(retrieval.min_score);

        Self {
            config,
            retriever,
            lexical: RwLock::new(None),
            chat,
            keyword,
            tfidf,
        }
    }

    /// Build the configured embedding client and, when enabled, the chat client
    pub fn from_config(config: Config) -> Result<Self> {
        let embedder: Box<dyn Embedder> = match config.embedding_provider {
            EmbeddingProvider::Ollama => Box::new(OllamaEmbedder::new(&config.ollama)?),
            EmbeddingProvider::OpenAi => {
                Box::new(OpenAiEmbedder::new(&config.openai_embeddings)?)
            }
        };

        let chat: Option<Box<dyn ChatModel>> = if config.llm.enabled {
            match OpenAiChatClient::new(&config.llm) {
                Ok(client) => Some(Box::new(client)),
                Err(e) => {
                    warn!("Chat model unavailable, answers will use retrieved context: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self::new(config, embedder, chat))
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the snapshot when it matches the current document and model, otherwise rebuild
    #[inline]
    pub fn init(&self) -> Result<InitOutcome> {
        self.init_with_progress(|_, _| {})
    }

    pub fn init_with_progress<F>(&self, on_progress: F) -> Result<InitOutcome>
    where
        F: FnMut(usize, usize),
    {
        let document = self.read_document()?;
        let source_hash = hash_document(&document);
        let model = self.retriever.embedder().model().to_string();
        let max_chunk_size = self.config.chunking.max_chunk_size;
        let snapshot_dir = self.config.snapshot_dir();

        match Snapshot::load(&snapshot_dir) {
            Ok(Some(snapshot))
                if snapshot.is_current(&source_hash, &model, max_chunk_size) =>
            {
                info!(
                    "Loaded snapshot with {} chunks from {}",
                    snapshot.manifest.chunks.len(),
                    snapshot_dir.display()
                );
                self.retriever
                    .install(Arc::new(KnowledgeBase::from_snapshot(snapshot)));
                return Ok(InitOutcome::LoadedSnapshot);
            }
            Ok(Some(_)) => info!("Snapshot is out of date, rebuilding"),
            Ok(None) => info!("No snapshot found in {}, building", snapshot_dir.display()),
            Err(e) => warn!("Ignoring unusable snapshot: {}", e),
        }

        self.rebuild_document(&document, on_progress)?;
        Ok(InitOutcome::Rebuilt)
    }

    /// Re-read the knowledge document, rebuild the index and persist it
    #[inline]
    pub fn rebuild(&self) -> Result<()> {
        self.rebuild_with_progress(|_, _| {})
    }

    #[inline]
    pub fn rebuild_with_progress<F>(&self, on_progress: F) -> Result<()>
    where
        F: FnMut(usize, usize),
    {
        let document = self.read_document()?;
        self.rebuild_document(&document, on_progress)
    }

    fn read_document(&self) -> Result<String> {
        let path = self.config.knowledge_path();
        let document = fs::read_to_string(&path).map_err(|e| {
            RagError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot read knowledge file {}: {e}", path.display()),
            ))
        })?;
        debug!("Read {} bytes from {}", document.len(), path.display());

        // Lexical search works from the document alone, so it is ready before any embedding
        self.install_lexical(LexicalCorpus::new(document.clone(), &self.tfidf));
        Ok(document)
    }

    fn rebuild_document<F>(&self, document: &str, on_progress: F) -> Result<()>
    where
        F: FnMut(usize, usize),
    {
        let knowledge = Arc::new(KnowledgeBase::build_with_progress(
            document,
            &self.config.chunking,
            self.retriever.embedder(),
            on_progress,
        )?);
        self.retriever.install(Arc::clone(&knowledge));
        info!(
            "Rebuilt knowledge base with {} chunks",
            knowledge.chunks().len()
        );

        // The rebuilt index is already serving; a failed save only costs the next startup
        let snapshot_dir = self.config.snapshot_dir();
        if let Err(e) = knowledge.to_snapshot().save(&snapshot_dir) {
            warn!(
                "Failed to save snapshot to {}, it will be rebuilt next time: {}",
                snapshot_dir.display(),
                e
            );
        }
        Ok(())
    }

    fn install_lexical(&self, corpus: LexicalCorpus) {
        let mut guard = self
            .lexical
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::new(corpus));
    }

    fn lexical_corpus(&self) -> Option<Arc<LexicalCorpus>> {
        self.lexical
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Vector retrieval only
    #[inline]
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        self.retriever.retrieve(query, k)
    }

    /// Numbered context of the `k` best chunks, or a fixed message when none are relevant
    #[inline]
    pub fn get_context_for_llm(&self, query: &str, k: usize) -> Result<String> {
        let results = self.retrieve(query, k)?;
        if results.is_empty() {
            return Ok(NO_RELEVANT_CONTEXT.to_string());
        }
        Ok(assemble(&results, &self.context_options()))
    }

    /// Vector search with TF-IDF and keyword fallbacks
    pub fn search(&self, query: &str, k: usize) -> Result<Option<ChainOutcome>> {
        let corpus = self.lexical_corpus();
        FallbackChain::new()
            .with(VectorStrategy::new(&self.retriever))
            .with(TfidfStrategy::new(corpus.as_deref(), &self.tfidf))
            .with(KeywordStrategy::new(corpus.as_deref(), &self.keyword))
            .run(query, k)
    }

    /// Answer a question. Only an empty question is an error; every other failure
    /// degrades to a fallback answer or an apology.
    pub fn answer(&self, query: &str) -> Result<Answer> {
        let outcome = match self.search(query, self.config.retrieval.top_k) {
            Ok(outcome) => outcome,
            Err(RagError::EmptyQuery) => return Err(RagError::EmptyQuery),
            Err(e) => {
                warn!("Search failed: {}", e);
                None
            }
        };

        let Some(ChainOutcome { strategy, passages }) = outcome else {
            return Ok(Answer {
                text: NO_INFORMATION_MESSAGE.to_string(),
                strategy: None,
                sources: Vec::new(),
                generated: false,
            });
        };

        let context = assemble(&passages, &self.context_options());
        let generated = self.chat.as_ref().and_then(|chat| {
            chat.complete(SYSTEM_PROMPT, &build_user_prompt(query, &context))
                .inspect_err(|e| warn!("Chat model failed, using fallback answer: {}", e))
                .ok()
        });

        Ok(Answer {
            generated: generated.is_some(),
            text: generated.unwrap_or_else(|| fallback_answer(query, &context, &self.keyword.rules)),
            strategy: Some(strategy),
            sources: passages,
        })
    }

    #[inline]
    pub fn status(&self) -> ServiceStatus {
        let knowledge = self.retriever.current();
        ServiceStatus {
            knowledge_path: self.config.knowledge_path(),
            snapshot_dir: self.config.snapshot_dir(),
            vector_ready: knowledge.is_some(),
            lexical_ready: self.lexical_corpus().is_some(),
            chunk_count: knowledge.as_ref().map_or(0, |kb| kb.chunks().len()),
            dimension: knowledge.as_ref().map_or(0, |kb| kb.index().dimension()),
            embedding_model: self.retriever.embedder().model().to_string(),
            source_hash: knowledge.as_ref().map(|kb| kb.source_hash().to_string()),
            chat_model: self.chat.as_ref().map(|chat| chat.model().to_string()),
        }
    }

    /// Drop the installed knowledge; later queries report `IndexNotReady`
    #[inline]
    pub fn shutdown(&self) {
        self.retriever.clear();
        let mut guard = self
            .lexical
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        info!("Knowledge service shut down");
    }

    fn context_options(&self) -> AssembleOptions {
        AssembleOptions {
            max_items: None,
            dedupe: self.config.retrieval.dedupe_context,
            style: ContextStyle::Numbered,
        }
    }
}
