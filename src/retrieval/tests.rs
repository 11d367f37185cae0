use super::*;
use crate::embeddings::HashingEmbedder;
use std::sync::atomic::{AtomicUsize, Ordering};

const KNOWLEDGE: &str = "\
## Programs
- Computer Science
- Business

## Fees
- Price: 2500 BAM per year

## Contact
- Location: Tuzla
";

/// Counts embedding calls and can be told to fail
#[derive(Debug, Default)]
struct CountingEmbedder {
    inner: HashingEmbedder,
    calls: AtomicUsize,
    fail: bool,
}

impl Embedder for CountingEmbedder {
    fn model(&self) -> &str {
        self.inner.model()
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagError::EmbeddingFailure("service unavailable".to_string()));
        }
        self.inner.embed(texts)
    }
}

fn built_retriever() -> Retriever<HashingEmbedder> {
    let embedder = HashingEmbedder::default();
    let knowledge = KnowledgeBase::build(KNOWLEDGE, &ChunkingConfig::default(), &embedder)
        .expect("knowledge base should build");
    let retriever = Retriever::new(embedder);
    retriever.install(Arc::new(knowledge));
    retriever
}

#[test]
fn programs_query_returns_programs_chunk() {
    let embedder = HashingEmbedder::default();
    let document = "## Programs\n- Computer Science\n- Business";
    let knowledge = KnowledgeBase::build(document, &ChunkingConfig::default(), &embedder)
        .expect("knowledge base should build");
    let retriever = Retriever::new(embedder);
    retriever.install(Arc::new(knowledge));

    let results = retriever
        .retrieve("computer science programs", 3)
        .expect("retrieve should succeed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.section.as_deref(), Some("Programs"));
    assert_eq!(results[0].chunk.text, document);
    assert!(results[0].score > 0.5);
}

#[test]
fn best_section_ranks_first() {
    let retriever = built_retriever();

    let results = retriever
        .retrieve("what is the price per year", 2)
        .expect("retrieve should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.section.as_deref(), Some("Fees"));
    assert!(results[0].score >= results[1].score);
}

#[test]
fn empty_query_is_rejected_without_embedding() {
    let embedder = CountingEmbedder::default();
    let retriever = Retriever::new(embedder);

    assert!(matches!(
        retriever.retrieve("   ", 3),
        Err(RagError::EmptyQuery)
    ));
    assert_eq!(retriever.embedder().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn missing_knowledge_base_is_not_ready() {
    let retriever = Retriever::new(HashingEmbedder::default());

    assert!(matches!(
        retriever.retrieve("programs", 3),
        Err(RagError::IndexNotReady)
    ));
}

#[test]
fn empty_knowledge_base_returns_nothing() {
    let embedder = CountingEmbedder::default();
    let knowledge = KnowledgeBase::build("", &ChunkingConfig::default(), &embedder)
        .expect("empty knowledge base should build");
    let retriever = Retriever::new(embedder);
    retriever.install(Arc::new(knowledge));

    let results = retriever
        .retrieve("programs", 3)
        .expect("retrieve should succeed");

    assert!(results.is_empty());
    assert_eq!(retriever.embedder().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn embedding_failure_propagates() {
    let embedder = CountingEmbedder {
        fail: true,
        ..CountingEmbedder::default()
    };

    let result = KnowledgeBase::build(KNOWLEDGE, &ChunkingConfig::default(), &embedder);

    let err = result.expect_err("build should fail");
    assert!(err.is_recoverable());
    assert!(matches!(err, RagError::EmbeddingFailure(_)));
}

#[test]
fn min_score_filters_results() {
    let retriever = built_retriever().with_min_score(Some(0.99));

    let results = retriever
        .retrieve("price", 3)
        .expect("retrieve should succeed");

    assert!(results.iter().all(|r| r.score >= 0.99));
    assert!(results.len() < 3);
}

#[test]
fn install_swaps_knowledge_base() {
    let retriever = built_retriever();
    let before = retriever.current().expect("knowledge base installed");

    let replacement = KnowledgeBase::build(
        "## Library\n- Open every day",
        &ChunkingConfig::default(),
        retriever.embedder(),
    )
    .expect("knowledge base should build");
    retriever.install(Arc::new(replacement));

    let results = retriever
        .retrieve("library", 5)
        .expect("retrieve should succeed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.section.as_deref(), Some("Library"));

    // A reader holding the old base still sees it intact
    assert_eq!(before.chunks().len(), 3);

    retriever.clear();
    assert!(retriever.current().is_none());
}

#[test]
fn progress_reports_every_batch() {
    let document: String = (0..70).map(|i| format!("# Section {i}\nline {i}\n")).collect();
    let mut reports = Vec::new();

    let knowledge = KnowledgeBase::build_with_progress(
        &document,
        &ChunkingConfig::default(),
        &HashingEmbedder::default(),
        |done, total| reports.push((done, total)),
    )
    .expect("knowledge base should build");

    assert_eq!(knowledge.chunks().len(), 70);
    assert_eq!(reports, vec![(0, 70), (32, 70), (64, 70), (70, 70)]);
}

#[test]
fn snapshot_round_trip_preserves_results() {
    let retriever = built_retriever();
    let knowledge = retriever.current().expect("knowledge base installed");

    let restored = KnowledgeBase::from_snapshot(knowledge.to_snapshot());

    assert_eq!(restored.chunks(), knowledge.chunks());
    assert_eq!(restored.source_hash(), hash_document(KNOWLEDGE));
    assert_eq!(restored.embedding_model(), "hashing-bow-256");
    assert_eq!(restored.max_chunk_size(), 500);

    let query = retriever
        .embedder()
        .embed_query("contact location")
        .expect("embedding should succeed");
    assert_eq!(
        restored.search(&query, 3, None).expect("search should succeed"),
        knowledge.search(&query, 3, None).expect("search should succeed")
    );
}
