use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding failed: {0}")]
    EmbeddingFailure(String),

    #[error("Knowledge index is not ready; build or load a snapshot first")]
    IndexNotReady,

    #[error("Knowledge index snapshot is corrupt: {0}")]
    IndexCorruption(String),

    #[error("Query is empty")]
    EmptyQuery,

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl RagError {
    /// Whether a caller may fall back to another retrieval strategy after this error.
    #[inline]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingFailure(_)
                | Self::IndexNotReady
                | Self::IndexCorruption(_)
                | Self::DimensionMismatch { .. }
        )
    }
}

pub mod commands;
pub mod config;
pub mod context;
pub mod embeddings;
pub mod http;
pub mod index;
pub mod lexical;
pub mod llm;
pub mod retrieval;
pub mod service;
pub mod strategy;
pub mod text;
