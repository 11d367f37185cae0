
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};

use super::{Config, ConfigError, EmbeddingProvider, OllamaConfig, OpenAiEmbeddingConfig};
use crate::embeddings::OllamaEmbedder;

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 Campus RAG Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir);

    eprintln!("{}", style("Knowledge Base").bold().yellow());
    configure_knowledge(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Embedding Provider").bold().yellow());
    eprintln!("Choose where chunk and query embeddings are computed.");
    eprintln!();

    let providers = &["ollama (local)", "openai (hosted)"];
    let default_index = match config.embedding_provider {
        EmbeddingProvider::Ollama => 0,
        EmbeddingProvider::OpenAi => 1,
    };
    let provider_index = Select::new()
        .with_prompt("Embedding provider")
        .default(default_index)
        .items(providers)
        .interact()?;

    if provider_index == 0 {
        config.embedding_provider = EmbeddingProvider::Ollama;
        configure_ollama(&mut config.ollama)?;

        eprintln!();
        eprintln!("{}", style("Testing configuration...").yellow());
        if test_ollama_connection(&config.ollama) {
            eprintln!("{}", style("✓ Ollama connection successful!").green());
        } else {
            eprintln!(
                "{}",
                style("⚠ Warning: Could not connect to Ollama").yellow()
            );
            eprintln!("You can continue, but make sure Ollama is running before building.");
        }
    } else {
        config.embedding_provider = EmbeddingProvider::OpenAi;
        configure_openai(&mut config.openai_embeddings)?;
    }

    eprintln!();
    eprintln!("{}", style("Response Generation").bold().yellow());
    configure_llm(&mut config)?;

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config(config: &Config) {
    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!(
        "Knowledge file: {}",
        style(config.knowledge_path().display()).cyan()
    );
    eprintln!(
        "Embedding provider: {}",
        style(config.embedding_provider).cyan()
    );
    eprintln!();

    match config.embedding_provider {
        EmbeddingProvider::Ollama => {
            eprintln!("{}", style("Ollama Settings:").bold().yellow());
            match config.ollama.ollama_url() {
                Ok(url) => eprintln!("  URL: {}", style(url).cyan()),
                Err(e) => eprintln!("  URL: {} ({})", style("Invalid").red(), e),
            }
            eprintln!("  Model: {}", style(&config.ollama.model).cyan());
            eprintln!("  Batch Size: {}", style(config.ollama.batch_size).cyan());
            eprintln!(
                "  Dimension: {}",
                style(config.ollama.embedding_dimension).cyan()
            );
        }
        EmbeddingProvider::OpenAi => {
            let openai = &config.openai_embeddings;
            eprintln!("{}", style("OpenAI Embedding Settings:").bold().yellow());
            eprintln!("  Endpoint: {}", style(&openai.endpoint).cyan());
            eprintln!("  Model: {}", style(&openai.model).cyan());
            eprintln!("  API key variable: {}", style(&openai.api_key_env).cyan());
            eprintln!("  Batch Size: {}", style(openai.batch_size).cyan());
            eprintln!("  Dimension: {}", style(openai.embedding_dimension).cyan());
        }
    }

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!(
        "  Max chunk size: {}",
        style(config.chunking.max_chunk_size).cyan()
    );
    eprintln!("  Top k: {}", style(config.retrieval.top_k).cyan());
    eprintln!(
        "  Keyword max results: {}",
        style(config.retrieval.keyword_max_results).cyan()
    );
    eprintln!(
        "  TF-IDF max results: {} (min score {})",
        style(config.retrieval.tfidf_max_results).cyan(),
        style(config.retrieval.tfidf_min_score).cyan()
    );
    if let Some(min_score) = config.retrieval.min_score {
        eprintln!("  Vector min score: {}", style(min_score).cyan());
    }
    eprintln!(
        "  Boost rules: {}",
        if config.retrieval.boost_rules.is_empty() {
            style("built-in".to_string()).dim()
        } else {
            style(config.retrieval.boost_rules.len().to_string()).cyan()
        }
    );

    eprintln!();
    eprintln!("{}", style("LLM Settings:").bold().yellow());
    if config.llm.enabled {
        eprintln!("  Endpoint: {}", style(&config.llm.endpoint).cyan());
        eprintln!("  Model: {}", style(&config.llm.model).cyan());
        eprintln!("  API key variable: {}", style(&config.llm.api_key_env).cyan());
        eprintln!("  Temperature: {}", style(config.llm.temperature).cyan());
        eprintln!("  Max tokens: {}", style(config.llm.max_tokens).cyan());
    } else {
        eprintln!("  {}", style("disabled (answers use retrieved context only)").dim());
    }

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
}

fn load_existing_config(config_dir: &Path) -> Config {
    Config::load(config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Config {
                base_dir: config_dir.to_path_buf(),
                ..Config::default()
            }
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            config
        },
    )
}

fn configure_knowledge(config: &mut Config) -> Result<()> {
    let knowledge_file: String = Input::new()
        .with_prompt("Knowledge document (relative to config dir or absolute)")
        .default(config.knowledge_file.display().to_string())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Path cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let max_chunk_size: usize = Input::new()
        .with_prompt("Maximum chunk size (characters)")
        .default(config.chunking.max_chunk_size)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (50..=8192).contains(input) {
                Ok(())
            } else {
                Err("Chunk size must be between 50 and 8192")
            }
        })
        .interact_text()?;

    config.knowledge_file = PathBuf::from(knowledge_file.trim());
    config.chunking.max_chunk_size = max_chunk_size;
    Ok(())
}

fn configure_ollama(ollama: &mut OllamaConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == ollama.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;

    let protocol = protocols[protocol_index].to_string();

    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(ollama.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            OllamaConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..OllamaConfig::default()
            }
            .validate()
        })
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(ollama.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(ollama.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(ollama.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let embedding_dimension: u32 = Input::new()
        .with_prompt("Embedding dimension (0 to accept any)")
        .default(ollama.embedding_dimension)
        .interact_text()?;

    ollama.set_protocol(protocol)?;
    ollama.set_host(host)?;
    ollama.set_port(port)?;
    ollama.set_model(model)?;
    ollama.set_batch_size(batch_size)?;
    ollama.set_embedding_dimension(embedding_dimension)?;

    Ok(())
}

fn configure_openai(openai: &mut OpenAiEmbeddingConfig) -> Result<()> {
    let endpoint: String = Input::new()
        .with_prompt("Embeddings endpoint (base URL)")
        .default(openai.endpoint.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            OpenAiEmbeddingConfig {
                endpoint: input.clone(),
                ..OpenAiEmbeddingConfig::default()
            }
            .endpoint_url()
            .map(|_| ())
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(openai.model.clone())
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("Environment variable holding the API key")
        .default(openai.api_key_env.clone())
        .interact_text()?;

    let embedding_dimension: u32 = Input::new()
        .with_prompt("Embedding dimension (0 to accept any)")
        .default(openai.embedding_dimension)
        .interact_text()?;

    let updated = OpenAiEmbeddingConfig {
        endpoint,
        model,
        api_key_env,
        embedding_dimension,
        ..openai.clone()
    };
    updated.validate()?;

    if std::env::var(&updated.api_key_env).is_err() {
        eprintln!(
            "{}",
            style(format!(
                "⚠ Warning: {} is not set in the environment",
                updated.api_key_env
            ))
            .yellow()
        );
    }

    *openai = updated;
    Ok(())
}

fn configure_llm(config: &mut Config) -> Result<()> {
    let enabled = Confirm::new()
        .with_prompt("Generate answers with a chat model?")
        .default(config.llm.enabled)
        .interact()?;
    config.llm.enabled = enabled;
    if !enabled {
        return Ok(());
    }

    let endpoint: String = Input::new()
        .with_prompt("Chat endpoint (OpenAI-compatible base URL)")
        .default(config.llm.endpoint.clone())
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Chat model")
        .default(config.llm.model.clone())
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("Environment variable holding the API key")
        .default(config.llm.api_key_env.clone())
        .interact_text()?;

    config.llm.endpoint = endpoint;
    config.llm.model = model;
    config.llm.api_key_env = api_key_env;
    config.llm.validate()?;
    Ok(())
}

fn test_ollama_connection(ollama: &OllamaConfig) -> bool {
    OllamaEmbedder::new(ollama)
        .map(|embedder| {
            embedder
                .with_timeout(Duration::from_secs(5))
                .with_retry_attempts(1)
        })
        .is_ok_and(|embedder| embedder.list_models().is_ok())
}
