
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::embeddings::chunking::ChunkingConfig;
use crate::embeddings::ollama::DEFAULT_EMBEDDING_DIMENSION;
use crate::lexical::BoostRule;

const CONFIG_DIR_NAME: &str = ".campus-rag";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Which embedding backend to use
    pub embedding_provider: EmbeddingProvider,
    /// Knowledge document; relative paths resolve against the config directory
    pub knowledge_file: PathBuf,
    pub ollama: OllamaConfig,
    pub openai_embeddings: OpenAiEmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding_provider: EmbeddingProvider::default(),
            knowledge_file: PathBuf::from("fakultetski_sadrzaj.txt"),
            ollama: OllamaConfig::default(),
            openai_embeddings: OpenAiEmbeddingConfig::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
            base_dir: PathBuf::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    Ollama,
    OpenAi,
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OllamaConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub batch_size: u32,
    /// Expected vector size; 0 accepts whatever the model returns
    pub embedding_dimension: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            model: "nomic-embed-text:latest".to_string(),
            batch_size: 64,
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiEmbeddingConfig {
    /// Base URL; `/embeddings` is appended
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub batch_size: u32,
    /// Expected vector size; 0 accepts whatever the model returns
    pub embedding_dimension: u32,
}

impl Default for OpenAiEmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://models.inference.ai.azure.com".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            batch_size: 64,
            embedding_dimension: 1536,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per query
    pub top_k: usize,
    /// Cap on keyword fallback hits
    pub keyword_max_results: usize,
    /// Cap on TF-IDF fallback hits
    pub tfidf_max_results: usize,
    /// TF-IDF hits scoring below this are dropped
    pub tfidf_min_score: f32,
    /// Vector hits scoring below this are dropped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
    /// Drop repeated passages when assembling context; off by default
    pub dedupe_context: bool,
    /// Keyword boost rules; empty uses the built-in set
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub boost_rules: Vec<BoostRule>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            keyword_max_results: 7,
            tfidf_max_results: 3,
            tfidf_min_score: 0.1,
            min_score: None,
            dedupe_context: false,
            boost_rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// When false, answers are produced from retrieved context only
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://models.inference.ai.azure.com".to_string(),
            model: "Mistral-small".to_string(),
            api_key_env: "GITHUB_TOKEN".to_string(),
            temperature: 0.3,
            max_tokens: 800,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid batch size: {0} (must be between 1 and 2048)")]
    InvalidBatchSize(u32),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid embedding dimension: {0} (must be 0 or between 8 and 8192)")]
    InvalidEmbeddingDimension(u32),
    #[error("Invalid max chunk size: {0} (must be between 50 and 8192)")]
    InvalidMaxChunkSize(usize),
    #[error("Invalid knowledge file path (cannot be empty)")]
    InvalidKnowledgeFile,
    #[error("Invalid {name}: {value} (must be between 1 and {max})")]
    InvalidResultCount {
        name: &'static str,
        value: usize,
        max: usize,
    },
    #[error("Invalid {name}: {value} (must be between {min} and {max})")]
    InvalidScore {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("Invalid boost rule '{0}' (needs at least one trigger and one term)")]
    InvalidBoostRule(String),
    #[error("Invalid temperature: {0} (must be between 0 and 2)")]
    InvalidTemperature(f32),
    #[error("Invalid max tokens: {0} (must be between 1 and 32768)")]
    InvalidMaxTokens(u32),
    #[error("Invalid timeout: {0} (must be between 1 and 600 seconds)")]
    InvalidTimeout(u64),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Load `config.toml` from `config_dir`, falling back to defaults when it does not exist
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// `~/.campus-rag`
    #[inline]
    pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the base directory for the application
    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.knowledge_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidKnowledgeFile);
        }
        self.ollama.validate()?;
        self.openai_embeddings.validate()?;
        self.validate_chunking_config()?;
        self.retrieval.validate()?;
        self.llm.validate()?;
        Ok(())
    }

    fn validate_chunking_config(&self) -> Result<(), ConfigError> {
        let max_chunk_size = self.chunking.max_chunk_size;
        if !(50..=8192).contains(&max_chunk_size) {
            return Err(ConfigError::InvalidMaxChunkSize(max_chunk_size));
        }
        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join(CONFIG_FILE_NAME)
    }

    /// Resolved path of the knowledge document
    #[inline]
    pub fn knowledge_path(&self) -> PathBuf {
        if self.knowledge_file.is_absolute() {
            self.knowledge_file.clone()
        } else {
            self.get_base_dir().join(&self.knowledge_file)
        }
    }

    /// Get the directory holding the persisted index snapshot
    #[inline]
    pub fn snapshot_dir(&self) -> PathBuf {
        self.get_base_dir().join("snapshot")
    }

    /// Model name of the configured embedding provider
    #[inline]
    pub fn embedding_model(&self) -> &str {
        match self.embedding_provider {
            EmbeddingProvider::Ollama => &self.ollama.model,
            EmbeddingProvider::OpenAi => &self.openai_embeddings.model,
        }
    }
}

fn validate_http_url(url_str: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(url_str).map_err(|_| ConfigError::InvalidUrl(url_str.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::InvalidProtocol(other.to_string())),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::InvalidUrl(url_str.to_string()));
    }
    Ok(url)
}

fn validate_dimension(dimension: u32) -> Result<(), ConfigError> {
    if dimension != 0 && !(8..=8192).contains(&dimension) {
        return Err(ConfigError::InvalidEmbeddingDimension(dimension));
    }
    Ok(())
}

fn validate_count(name: &'static str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::InvalidResultCount { name, value, max });
    }
    Ok(())
}

fn validate_score(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ConfigError::InvalidScore {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl OllamaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidProtocol(self.protocol.clone()));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidUrl(format!(
                "{}://{}:{}",
                self.protocol, self.host, self.port
            )));
        }

        self.ollama_url()?;

        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        validate_dimension(self.embedding_dimension)
    }

    pub fn ollama_url(&self) -> Result<Url, ConfigError> {
        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }

    pub fn set_protocol(&mut self, protocol: String) -> Result<(), ConfigError> {
        if protocol != "http" && protocol != "https" {
            return Err(ConfigError::InvalidProtocol(protocol));
        }
        self.protocol = protocol;
        Ok(())
    }

    pub fn set_host(&mut self, host: String) -> Result<(), ConfigError> {
        let temp_config = Self {
            host: host.clone(),
            ..self.clone()
        };
        temp_config.validate()?;
        self.host = host;
        Ok(())
    }

    pub fn set_port(&mut self, port: u16) -> Result<(), ConfigError> {
        if port == 0 {
            return Err(ConfigError::InvalidPort(port));
        }
        self.port = port;
        Ok(())
    }

    pub fn set_model(&mut self, model: String) -> Result<(), ConfigError> {
        if model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(model));
        }
        self.model = model;
        Ok(())
    }

    pub fn set_batch_size(&mut self, batch_size: u32) -> Result<(), ConfigError> {
        if batch_size == 0 || batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(batch_size));
        }
        self.batch_size = batch_size;
        Ok(())
    }

    pub fn set_embedding_dimension(&mut self, dimension: u32) -> Result<(), ConfigError> {
        validate_dimension(dimension)?;
        self.embedding_dimension = dimension;
        Ok(())
    }
}

impl OpenAiEmbeddingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if self.batch_size == 0 || self.batch_size > 2048 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        validate_dimension(self.embedding_dimension)
    }

    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        validate_http_url(&self.endpoint)
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_count("top_k", self.top_k, 50)?;
        validate_count("keyword_max_results", self.keyword_max_results, 100)?;
        validate_count("tfidf_max_results", self.tfidf_max_results, 100)?;
        validate_score("tfidf_min_score", self.tfidf_min_score, 0.0, 1.0)?;
        if let Some(min_score) = self.min_score {
            validate_score("min_score", min_score, -1.0, 1.0)?;
        }

        for rule in &self.boost_rules {
            if rule.triggers.is_empty() || rule.extra_terms.is_empty() {
                return Err(ConfigError::InvalidBoostRule(rule.name.clone()));
            }
        }

        Ok(())
    }
}

impl LlmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }

        if self.max_tokens == 0 || self.max_tokens > 32768 {
            return Err(ConfigError::InvalidMaxTokens(self.max_tokens));
        }

        if !(1..=600).contains(&self.timeout_seconds) {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        validate_http_url(&self.endpoint)
    }
}
