mod chunker;
mod embedding;
mod pipeline;
mod vector_store;

pub use chunker::{TextChunker, assign_chunk_ids};
pub use embedding::{Embedder, OpenAiEmbedder};
pub use pipeline::{DEFAULT_BATCH_SIZE, DEFAULT_ERROR_LOG, UpsertPipeline, UpsertReport};
pub use vector_store::{
    IndexInfo, IndexRecord, MemoryBackend, QdrantBackend, VectorIndex, create_backend,
    ensure_ready,
};
