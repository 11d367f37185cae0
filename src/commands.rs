use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::{Config, EmbeddingProvider};
use crate::embeddings::{OllamaEmbedder, estimate_token_count};
use crate::index::{Snapshot, hash_document};
use crate::service::{InitOutcome, KnowledgeService};

fn progress_bar() -> ProgressBar {
    if console::user_attended_stderr() {
        ProgressBar::new(0).with_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] Embedding chunks {wide_bar}")
                .expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    }
}

/// Build the service and load or build its knowledge base, showing embedding progress
fn open_service(config: Config) -> Result<KnowledgeService> {
    let service =
        KnowledgeService::from_config(config).context("Failed to create knowledge service")?;

    let bar = progress_bar();
    let outcome = service.init_with_progress(|done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    });
    bar.finish_and_clear();

    match outcome {
        Ok(InitOutcome::LoadedSnapshot) => info!("Using existing snapshot"),
        Ok(InitOutcome::Rebuilt) => info!("Knowledge base rebuilt"),
        Err(e) if e.is_recoverable() => {
            warn!("Vector search unavailable, falling back to lexical search: {}", e);
        }
        Err(e) => return Err(e).context("Failed to initialize knowledge base"),
    }

    Ok(service)
}

/// Build the knowledge base, reusing a current snapshot unless `force` is set
#[inline]
pub fn build_knowledge(config: Config, force: bool) -> Result<()> {
    let service =
        KnowledgeService::from_config(config).context("Failed to create knowledge service")?;

    let bar = progress_bar();
    let on_progress = |done: usize, total: usize| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    };

    let outcome = if force {
        service
            .rebuild_with_progress(on_progress)
            .map(|()| InitOutcome::Rebuilt)
    } else {
        service.init_with_progress(on_progress)
    };
    bar.finish_and_clear();
    let outcome = outcome.context("Failed to build knowledge base")?;

    let status = service.status();
    match outcome {
        InitOutcome::LoadedSnapshot => println!("Snapshot is up to date, nothing to rebuild."),
        InitOutcome::Rebuilt => println!("Knowledge base built."),
    }
    println!("  Chunks: {}", status.chunk_count);
    println!("  Dimension: {}", status.dimension);
    println!("  Model: {}", status.embedding_model);
    println!("  Snapshot: {}", status.snapshot_dir.display());

    Ok(())
}

/// Print the passages the fallback chain finds for `query`
#[inline]
pub fn search_knowledge(config: Config, query: &str, k: Option<usize>) -> Result<()> {
    let k = k.unwrap_or(config.retrieval.top_k);
    let service = open_service(config)?;

    let Some(outcome) = service.search(query, k).context("Search failed")? else {
        println!("No results found for: {}", query);
        return Ok(());
    };

    println!(
        "Found {} results via {} search:",
        outcome.passages.len(),
        outcome.strategy
    );
    println!();
    for (i, passage) in outcome.passages.iter().enumerate() {
        match &passage.section {
            Some(section) => println!("{}. [{:.3}] {}", i + 1, passage.score, section),
            None => println!("{}. [{:.3}]", i + 1, passage.score),
        }
        for line in passage.text.lines() {
            println!("   {}", line);
        }
        println!();
    }

    Ok(())
}

/// Print the context block that would be sent to the chat model
#[inline]
pub fn show_context(config: Config, query: &str, k: Option<usize>) -> Result<()> {
    let k = k.unwrap_or(config.retrieval.top_k);
    let service = open_service(config)?;

    let context = service
        .get_context_for_llm(query, k)
        .context("Failed to assemble context")?;
    println!("{}", context);

    Ok(())
}

/// Answer a question and list the passages it was based on
#[inline]
pub fn ask(config: Config, query: &str) -> Result<()> {
    let service = open_service(config)?;

    let answer = service.answer(query).context("Failed to answer question")?;
    println!("{}", answer.text);

    if let Some(strategy) = answer.strategy {
        println!();
        println!(
            "Sources ({} search, {}):",
            strategy,
            if answer.generated {
                "generated"
            } else {
                "extracted"
            }
        );
        for passage in &answer.sources {
            let first_line = passage.text.lines().next().unwrap_or_default();
            println!("  - {}", first_line);
        }
    }

    Ok(())
}

/// Report knowledge file, snapshot and backend health without building anything
#[inline]
pub fn show_status(config: &Config) -> Result<()> {
    println!("📊 Campus RAG Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("📄 Knowledge File:");
    let knowledge_path = config.knowledge_path();
    let source_hash = match std::fs::read_to_string(&knowledge_path) {
        Ok(document) => {
            println!("   ✅ {}", knowledge_path.display());
            println!(
                "   📏 {} bytes, ~{} tokens",
                document.len(),
                estimate_token_count(&document)
            );
            Some(hash_document(&document))
        }
        Err(e) => {
            println!("   ❌ {}: {}", knowledge_path.display(), e);
            None
        }
    };

    println!();
    println!("🔍 Snapshot:");
    let snapshot_dir = config.snapshot_dir();
    match Snapshot::load(&snapshot_dir) {
        Ok(Some(snapshot)) => {
            let manifest = &snapshot.manifest;
            println!("   ✅ {}", snapshot_dir.display());
            println!("   📋 Chunks: {}", manifest.chunks.len());
            println!("   🔢 Dimension: {}", manifest.dimension);
            println!("   🤖 Model: {}", manifest.embedding_model);
            println!(
                "   🕐 Created: {}",
                manifest.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("   ✂️  Chunk size: {}", manifest.max_chunk_size);
            let current = source_hash.as_deref().is_some_and(|hash| {
                snapshot.is_current(
                    hash,
                    config.embedding_model(),
                    config.chunking.max_chunk_size,
                )
            });
            if current {
                println!("   ✅ Up to date");
            } else {
                println!("   ⚠️  Stale: run 'campus-rag build' to rebuild");
            }
        }
        Ok(None) => println!("   ❌ No snapshot yet: run 'campus-rag build'"),
        Err(e) => println!("   ❌ Unusable snapshot: {}", e),
    }

    println!();
    println!("🤖 Embedding Provider ({}):", config.embedding_provider);
    match config.embedding_provider {
        EmbeddingProvider::Ollama => match OllamaEmbedder::new(&config.ollama) {
            Ok(client) => match client.with_retry_attempts(1).health_check() {
                Ok(()) => println!(
                    "   ✅ Ollama: Connected ({}:{}), model {}",
                    config.ollama.host, config.ollama.port, config.ollama.model
                ),
                Err(e) => println!("   ⚠️  Ollama: {:#}", e),
            },
            Err(e) => println!("   ❌ Ollama: {}", e),
        },
        EmbeddingProvider::OpenAi => {
            let openai = &config.openai_embeddings;
            println!("   📋 Endpoint: {}", openai.endpoint);
            println!("   📋 Model: {}", openai.model);
            if std::env::var(&openai.api_key_env).is_ok() {
                println!("   ✅ API key found in {}", openai.api_key_env);
            } else {
                println!("   ⚠️  {} is not set", openai.api_key_env);
            }
        }
    }

    println!();
    println!("💬 Chat Model:");
    if config.llm.enabled {
        println!("   📋 {} at {}", config.llm.model, config.llm.endpoint);
        if std::env::var(&config.llm.api_key_env).is_ok() {
            println!("   ✅ API key found in {}", config.llm.api_key_env);
        } else {
            println!(
                "   ⚠️  {} is not set, answers will be extracted from context",
                config.llm.api_key_env
            );
        }
    } else {
        println!("   ⏸️  Disabled, answers are extracted from context");
    }

    Ok(())
}
