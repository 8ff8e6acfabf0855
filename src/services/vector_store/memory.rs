//! In-memory vector index backend.
//!
//! A local index with cosine similarity. Serves small single-process
//! workloads and doubles as the stub index in pipeline tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{IndexInfo, IndexRecord, VectorIndex};
use crate::error::VectorStoreError;
use crate::models::SearchResult;

struct StoredPoint {
    values: Vec<f32>,
    payload: HashMap<String, String>,
}

pub struct MemoryBackend {
    index: String,
    created: AtomicBool,
    points: RwLock<HashMap<String, StoredPoint>>,
}

impl MemoryBackend {
    pub fn new(name: &str) -> Self {
        Self {
            index: name.to_string(),
            created: AtomicBool::new(false),
            points: RwLock::new(HashMap::new()),
        }
    }

    /// Stored values for a record ID, if present. Test/inspection helper.
    pub fn get_values(&self, id: &str) -> Option<Vec<f32>> {
        self.points
            .read()
            .expect("points lock poisoned")
            .get(id)
            .map(|p| p.values.clone())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for MemoryBackend {
    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        Ok(true)
    }

    async fn list_indexes(&self) -> Result<Vec<String>, VectorStoreError> {
        if self.created.load(Ordering::SeqCst) {
            Ok(vec![self.index.clone()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn create_index(&self) -> Result<(), VectorStoreError> {
        self.created.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn index_info(&self) -> Result<Option<IndexInfo>, VectorStoreError> {
        if !self.created.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let points = self.points.read().expect("points lock poisoned");
        Ok(Some(IndexInfo {
            points_count: points.len() as u64,
        }))
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<(), VectorStoreError> {
        let mut points = self.points.write().expect("points lock poisoned");
        for record in records {
            points.insert(
                record.id,
                StoredPoint {
                    values: record.values,
                    payload: record.payload,
                },
            );
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        limit: u64,
        min_score: Option<f32>,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let points = self.points.read().expect("points lock poisoned");

        let mut results: Vec<SearchResult> = points
            .iter()
            .map(|(id, point)| SearchResult {
                id: id.clone(),
                score: cosine_similarity(&vector, &point.values),
                content: point.payload.get("content").cloned().unwrap_or_default(),
                source: point.payload.get("source").cloned().unwrap_or_default(),
            })
            .filter(|r| min_score.is_none_or(|threshold| r.score >= threshold))
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        results.truncate(limit as usize);

        Ok(results)
    }

    fn name(&self) -> &str {
        &self.index
    }
}
