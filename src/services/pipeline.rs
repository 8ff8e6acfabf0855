//! Batched embed-and-upsert pipeline.
//!
//! Chunks are committed in source order, one bounded batch at a time, with
//! no cross-batch atomicity: a failure partway through leaves prior
//! batches committed and everything from the failing batch on uncommitted.
//! There is no retry; a rerun restarts from the first batch, which is safe
//! (upsert is idempotent by chunk ID) but re-does committed work.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::models::DocumentChunk;
use crate::services::embedding::Embedder;
use crate::services::vector_store::{IndexRecord, VectorIndex};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Diagnostic side-channel, overwritten on each failure (last failure
/// only, not a history).
pub const DEFAULT_ERROR_LOG: &str = "error-log.txt";

type ProgressFn = Box<dyn Fn(u32, u32) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
    pub chunks_upserted: u64,
    pub batches_committed: u32,
}

/// Embeds chunk contents and commits the resulting records to a vector
/// index, batch by batch.
pub struct UpsertPipeline<'a> {
    embedder: &'a dyn Embedder,
    batch_size: usize,
    error_log: PathBuf,
    progress: Option<ProgressFn>,
}

impl<'a> UpsertPipeline<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self {
            embedder,
            batch_size: DEFAULT_BATCH_SIZE,
            error_log: PathBuf::from(DEFAULT_ERROR_LOG),
            progress: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_error_log(mut self, path: impl AsRef<Path>) -> Self {
        self.error_log = path.as_ref().to_path_buf();
        self
    }

    /// Observe progress as `(batches_committed, total_batches)` after each
    /// committed batch.
    pub fn with_progress(mut self, progress: impl Fn(u32, u32) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn error_log(&self) -> &Path {
        &self.error_log
    }

    /// Embed and upsert all chunks.
    ///
    /// On any embedding or index failure the underlying cause is written
    /// to the diagnostic file and the caller gets the single generic
    /// [`PipelineError::UpsertFailed`]; the detail lives only in the file.
    pub async fn run(
        &self,
        index: &dyn VectorIndex,
        chunks: &[DocumentChunk],
    ) -> Result<UpsertReport, PipelineError> {
        match self.run_batches(index, chunks).await {
            Ok(report) => Ok(report),
            Err(cause) => {
                self.write_diagnostic(&cause);
                Err(PipelineError::UpsertFailed)
            }
        }
    }

    async fn run_batches(
        &self,
        index: &dyn VectorIndex,
        chunks: &[DocumentChunk],
    ) -> Result<UpsertReport> {
        let total_batches = chunks.len().div_ceil(self.batch_size) as u32;
        let mut report = UpsertReport::default();

        for (batch_index, batch) in chunks.chunks(self.batch_size).enumerate() {
            let batch_number = batch_index as u32 + 1;

            let texts: Vec<String> = batch.iter().map(|chunk| chunk.content.clone()).collect();

            let vectors = self.embedder.embed_batch(&texts).await.with_context(|| {
                format!("failed to embed batch {} of {}", batch_number, total_batches)
            })?;

            anyhow::ensure!(
                vectors.len() == batch.len(),
                "embedding provider returned {} vectors for {} chunks in batch {}",
                vectors.len(),
                batch.len(),
                batch_number
            );

            let records: Vec<IndexRecord> = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, values)| IndexRecord {
                    id: chunk.id.clone(),
                    values,
                    payload: chunk_payload(chunk),
                })
                .collect();

            index.upsert(records).await.with_context(|| {
                format!("failed to upsert batch {} of {}", batch_number, total_batches)
            })?;

            report.batches_committed = batch_number;
            report.chunks_upserted += batch.len() as u64;

            if let Some(ref progress) = self.progress {
                progress(batch_number, total_batches);
            }
        }

        Ok(report)
    }

    /// Best-effort: a failed diagnostic write must never mask the
    /// pipeline failure itself.
    fn write_diagnostic(&self, cause: &anyhow::Error) {
        let _ = std::fs::write(&self.error_log, format!("{:?}\n", cause));
    }
}

fn chunk_payload(chunk: &DocumentChunk) -> HashMap<String, String> {
    let mut payload = HashMap::new();
    payload.insert("content".to_string(), chunk.content.clone());
    payload.insert("document_id".to_string(), chunk.document_id.clone());
    payload.insert("source".to_string(), chunk.source.clone());
    payload.insert("chunk_index".to_string(), chunk.chunk_index.to_string());
    payload.insert("total_chunks".to_string(), chunk.total_chunks.to_string());
    payload.insert("checksum".to_string(), chunk.checksum.clone());
    payload.insert("created_at".to_string(), chunk.created_at.clone());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::error::{EmbeddingError, VectorStoreError};
    use crate::services::vector_store::MemoryBackend;

    /// Embedder that records call sizes and hands out vectors whose first
    /// component is the global submission ordinal.
    struct StubEmbedder {
        calls: Mutex<Vec<usize>>,
        submitted: AtomicUsize,
        fail_on_batch: Option<usize>,
    }

    impl StubEmbedder {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                submitted: AtomicUsize::new(0),
                fail_on_batch: None,
            }
        }

        fn failing_on(batch: usize) -> Self {
            Self {
                fail_on_batch: Some(batch),
                ..Self::new()
            }
        }

        fn call_sizes(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            let batch_number = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(texts.len());
                calls.len()
            };

            if self.fail_on_batch == Some(batch_number) {
                return Err(EmbeddingError::ApiError("quota exhausted".to_string()));
            }

            Ok(texts
                .iter()
                .map(|_| {
                    let ordinal = self.submitted.fetch_add(1, Ordering::SeqCst);
                    vec![ordinal as f32, 1.0]
                })
                .collect())
        }

        fn dimension(&self) -> u32 {
            2
        }
    }

    /// Index whose upserts always fail.
    struct ExplodingIndex;

    #[async_trait]
    impl VectorIndex for ExplodingIndex {
        async fn health_check(&self) -> Result<bool, VectorStoreError> {
            Ok(true)
        }

        async fn list_indexes(&self) -> Result<Vec<String>, VectorStoreError> {
            Ok(vec!["exploding".to_string()])
        }

        async fn create_index(&self) -> Result<(), VectorStoreError> {
            Ok(())
        }

        async fn index_info(
            &self,
        ) -> Result<Option<crate::services::vector_store::IndexInfo>, VectorStoreError> {
            Ok(None)
        }

        async fn upsert(&self, _records: Vec<IndexRecord>) -> Result<(), VectorStoreError> {
            Err(VectorStoreError::UpsertError("write refused".to_string()))
        }

        async fn query(
            &self,
            _vector: Vec<f32>,
            _limit: u64,
            _min_score: Option<f32>,
        ) -> Result<Vec<crate::models::SearchResult>, VectorStoreError> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "exploding"
        }
    }

    fn make_chunks(count: usize) -> Vec<DocumentChunk> {
        (0..count)
            .map(|i| DocumentChunk {
                id: format!("chunk_{}", i + 1),
                document_id: "doc".to_string(),
                content: format!("chunk content {}", i),
                chunk_index: i as u32,
                total_chunks: count as u32,
                source: "/test.pdf".to_string(),
                checksum: "checksum".to_string(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_250_chunks_in_batches_of_100() {
        let embedder = StubEmbedder::new();
        let index = MemoryBackend::new("test");
        index.create_index().await.unwrap();

        let progress: Arc<Mutex<Vec<(u32, u32)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&progress);

        let pipeline = UpsertPipeline::new(&embedder)
            .with_progress(move |done, total| seen.lock().unwrap().push((done, total)));

        let chunks = make_chunks(250);
        let report = pipeline.run(&index, &chunks).await.unwrap();

        assert_eq!(embedder.call_sizes(), vec![100, 100, 50]);
        assert_eq!(*progress.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(report.chunks_upserted, 250);
        assert_eq!(report.batches_committed, 3);
        assert_eq!(
            index.index_info().await.unwrap().unwrap().points_count,
            250
        );
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_short_batch() {
        let embedder = StubEmbedder::new();
        let index = MemoryBackend::new("test");
        index.create_index().await.unwrap();

        let pipeline = UpsertPipeline::new(&embedder).with_batch_size(50);
        let chunks = make_chunks(100);
        pipeline.run(&index, &chunks).await.unwrap();

        assert_eq!(embedder.call_sizes(), vec![50, 50]);
    }

    #[tokio::test]
    async fn test_order_preservation() {
        let embedder = StubEmbedder::new();
        let index = MemoryBackend::new("test");
        index.create_index().await.unwrap();

        let pipeline = UpsertPipeline::new(&embedder).with_batch_size(10);
        let chunks = make_chunks(25);
        pipeline.run(&index, &chunks).await.unwrap();

        // Each record carries the vector produced for its position.
        assert_eq!(index.get_values("chunk_1").unwrap()[0], 0.0);
        assert_eq!(index.get_values("chunk_17").unwrap()[0], 16.0);
        assert_eq!(index.get_values("chunk_25").unwrap()[0], 24.0);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_prior_batches() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("error-log.txt");

        let embedder = StubEmbedder::failing_on(2);
        let index = MemoryBackend::new("test");
        index.create_index().await.unwrap();

        let pipeline = UpsertPipeline::new(&embedder).with_error_log(&log_path);
        let chunks = make_chunks(150);
        let result = pipeline.run(&index, &chunks).await;

        assert!(matches!(result, Err(PipelineError::UpsertFailed)));
        assert_eq!(
            index.index_info().await.unwrap().unwrap().points_count,
            100
        );
        assert!(index.get_values("chunk_100").is_some());
        assert!(index.get_values("chunk_101").is_none());
    }

    #[tokio::test]
    async fn test_diagnostic_file_contains_cause() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("error-log.txt");

        let embedder = StubEmbedder::failing_on(1);
        let index = MemoryBackend::new("test");
        index.create_index().await.unwrap();

        let pipeline = UpsertPipeline::new(&embedder).with_error_log(&log_path);
        let chunks = make_chunks(5);
        assert!(pipeline.run(&index, &chunks).await.is_err());

        let body = std::fs::read_to_string(&log_path).unwrap();
        assert!(body.contains("quota exhausted"));
        assert!(body.contains("failed to embed batch 1 of 1"));
    }

    #[tokio::test]
    async fn test_diagnostic_file_is_overwritten_not_appended() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("error-log.txt");

        let chunks = make_chunks(5);

        let embedder = StubEmbedder::failing_on(1);
        let index = MemoryBackend::new("test");
        index.create_index().await.unwrap();
        let pipeline = UpsertPipeline::new(&embedder).with_error_log(&log_path);
        assert!(pipeline.run(&index, &chunks).await.is_err());

        let embedder = StubEmbedder::new();
        let pipeline = UpsertPipeline::new(&embedder).with_error_log(&log_path);
        assert!(pipeline.run(&ExplodingIndex, &chunks).await.is_err());

        let body = std::fs::read_to_string(&log_path).unwrap();
        assert!(body.contains("write refused"));
        assert!(!body.contains("quota exhausted"));
    }

    #[tokio::test]
    async fn test_index_failure_escalates_as_upsert_failed() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("error-log.txt");

        let embedder = StubEmbedder::new();
        let pipeline = UpsertPipeline::new(&embedder).with_error_log(&log_path);
        let chunks = make_chunks(3);

        let result = pipeline.run(&ExplodingIndex, &chunks).await;
        assert!(matches!(result, Err(PipelineError::UpsertFailed)));
        assert!(log_path.exists());
    }

    #[tokio::test]
    async fn test_empty_input_is_a_no_op() {
        let embedder = StubEmbedder::new();
        let index = MemoryBackend::new("test");
        index.create_index().await.unwrap();

        let progress: Arc<Mutex<Vec<(u32, u32)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&progress);
        let pipeline = UpsertPipeline::new(&embedder)
            .with_progress(move |done, total| seen.lock().unwrap().push((done, total)));

        let report = pipeline.run(&index, &[]).await.unwrap();

        assert_eq!(report, UpsertReport::default());
        assert!(embedder.call_sizes().is_empty());
        assert!(progress.lock().unwrap().is_empty());
    }
}
