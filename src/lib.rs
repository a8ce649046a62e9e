use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document load error: {0}")]
    Loader(String),

    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Generation service error: {0}")]
    Generation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod chunking;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod guideline;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod recommend;
