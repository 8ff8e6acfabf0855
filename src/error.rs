//! Error types for the docvec CLI.

use thiserror::Error;

/// Errors related to loading and splitting documents.
#[derive(Debug, Error)]
pub enum ChunkingError {
    #[error("failed to extract text from {path}: {reason}")]
    ExtractError { path: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("directory walk error: {0}")]
    WalkError(String),

    #[error("no PDF files found under {0}")]
    NoPdfsFound(String),

    #[error("document is empty: {0}")]
    EmptyDocument(String),
}

/// Errors related to the embedding provider.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to connect to embedding provider: {0}")]
    ConnectionError(String),

    #[error("embedding provider error: {0}")]
    ApiError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding request timed out")]
    Timeout,
}

/// Errors related to vector index operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to vector index: {0}")]
    ConnectionError(String),

    #[error("index creation error: {0}")]
    CreateError(String),

    #[error("upsert error: {0}")]
    UpsertError(String),

    #[error("query error: {0}")]
    QueryError(String),

    #[error("index '{name}' not ready after {timeout_secs}s")]
    ReadyTimeout { name: String, timeout_secs: u64 },

    #[error("vector index client error: {0}")]
    ClientError(String),
}

/// The single aggregate failure raised by the embed-and-upsert pipeline.
///
/// Carries no detail on purpose: the underlying cause is written to the
/// pipeline's diagnostic file before this is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to embed and store documents")]
    UpsertFailed,
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}
