mod config;
mod document;
mod search;

pub use config::{
    ChunkingConfig, Config, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_EMBEDDING_URL, DEFAULT_INDEX_NAME, DEFAULT_QDRANT_URL, EmbeddingConfig, IndexConfig,
    IndexDriver, SearchConfig,
};
pub use document::{Document, DocumentChunk, DocumentMetadata, coerce_content};
pub use search::{OutputFormat, SearchResult, SearchResults};
