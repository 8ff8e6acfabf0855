//! Vector index abstraction layer.
//!
//! A trait-based abstraction over vector index backends (Qdrant for
//! remote/managed clusters, an in-memory index for local use and tests),
//! selected by configuration.

mod memory;
mod qdrant;

pub use memory::MemoryBackend;
pub use qdrant::QdrantBackend;

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::VectorStoreError;
use crate::models::{IndexConfig, IndexDriver, SearchResult};
use crate::utils::Backoff;

/// The unit committed to a vector index: one chunk's ID, its embedding,
/// and a self-describing payload.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub payload: HashMap<String, String>,
}

/// Index information.
#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub points_count: u64,
}

/// Abstract vector index operations.
///
/// Upsert and query are idempotent at the record-ID level; overlapping
/// concurrent writers resolve last-write-wins.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Check if the index service is reachable.
    async fn health_check(&self) -> Result<bool, VectorStoreError>;

    /// List the index names known to the backend.
    async fn list_indexes(&self) -> Result<Vec<String>, VectorStoreError>;

    /// Create this backend's index. Remote indexes may materialize
    /// asynchronously; see [`ensure_ready`].
    async fn create_index(&self) -> Result<(), VectorStoreError>;

    /// Information about this backend's index, or `None` if it does not
    /// exist yet.
    async fn index_info(&self) -> Result<Option<IndexInfo>, VectorStoreError>;

    /// Insert or update records by ID.
    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<(), VectorStoreError>;

    /// Top-k similarity query.
    async fn query(
        &self,
        vector: Vec<f32>,
        limit: u64,
        min_score: Option<f32>,
    ) -> Result<Vec<SearchResult>, VectorStoreError>;

    /// The index name this handle is scoped to.
    fn name(&self) -> &str;
}

/// Create a vector index backend based on configuration.
pub fn create_backend(
    config: &IndexConfig,
    dimension: u32,
) -> Result<Box<dyn VectorIndex>, VectorStoreError> {
    match config.driver {
        IndexDriver::Qdrant => Ok(Box::new(QdrantBackend::new(config, u64::from(dimension))?)),
        IndexDriver::Memory => Ok(Box::new(MemoryBackend::new(&config.name))),
    }
}

/// Create the index if missing, then poll until it is queryable.
///
/// Remote indexes are not immediately usable after creation. Rather than a
/// fixed sleep, this polls `index_info` with exponential backoff (500ms,
/// doubling, capped at 10s) until the index exists or the deadline passes.
pub async fn ensure_ready(
    index: &dyn VectorIndex,
    timeout: Duration,
) -> Result<(), VectorStoreError> {
    let existing = index.list_indexes().await?;
    if !existing.iter().any(|name| name == index.name()) {
        index.create_index().await?;
    }

    let deadline = Instant::now() + timeout;
    let mut backoff = Backoff::default();

    loop {
        if index.index_info().await?.is_some() {
            return Ok(());
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(VectorStoreError::ReadyTimeout {
                name: index.name().to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }

        let delay = backoff.next_delay().min(deadline - now);
        tokio::time::sleep(delay).await;
    }
}
