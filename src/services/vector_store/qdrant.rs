//! Qdrant vector index backend.

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::{IndexInfo, IndexRecord, VectorIndex};
use crate::error::VectorStoreError;
use crate::models::{IndexConfig, SearchResult};

/// Remote (optionally managed/hosted) index over the Qdrant API.
pub struct QdrantBackend {
    client: Qdrant,
    index: String,
    dimension: u64,
    distance: Distance,
}

impl QdrantBackend {
    pub fn new(config: &IndexConfig, dimension: u64) -> Result<Self, VectorStoreError> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .build()
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            index: config.name.clone(),
            dimension,
            distance: parse_metric(&config.metric)?,
        })
    }
}

/// Qdrant point IDs must be UUIDs or integers, so external chunk IDs are
/// mapped through a deterministic UUIDv5 and kept in the payload as
/// `external_id`. Same external ID, same point — upsert idempotence by
/// external ID is preserved.
fn point_uuid(external_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, external_id.as_bytes()).to_string()
}

fn parse_metric(metric: &str) -> Result<Distance, VectorStoreError> {
    match metric.to_lowercase().as_str() {
        "cosine" => Ok(Distance::Cosine),
        "euclid" | "euclidean" => Ok(Distance::Euclid),
        "dot" => Ok(Distance::Dot),
        other => Err(VectorStoreError::ClientError(format!(
            "unknown distance metric: {}",
            other
        ))),
    }
}

#[async_trait]
impl VectorIndex for QdrantBackend {
    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        self.client
            .health_check()
            .await
            .map(|_| true)
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))
    }

    async fn list_indexes(&self) -> Result<Vec<String>, VectorStoreError> {
        let response = self
            .client
            .list_collections()
            .await
            .map_err(|e| VectorStoreError::ClientError(e.to_string()))?;

        Ok(response
            .collections
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    async fn create_index(&self) -> Result<(), VectorStoreError> {
        let create_collection = CreateCollectionBuilder::new(&self.index)
            .vectors_config(VectorParamsBuilder::new(self.dimension, self.distance));

        self.client
            .create_collection(create_collection)
            .await
            .map_err(|e| VectorStoreError::CreateError(e.to_string()))?;

        Ok(())
    }

    async fn index_info(&self) -> Result<Option<IndexInfo>, VectorStoreError> {
        match self.client.collection_info(&self.index).await {
            Ok(info) => Ok(Some(IndexInfo {
                points_count: info.result.map_or(0, |r| r.points_count.unwrap_or(0)),
            })),
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("not found") || msg.contains("doesn't exist") {
                    Ok(None)
                } else {
                    Err(VectorStoreError::ClientError(msg))
                }
            }
        }
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<(), VectorStoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|record| {
                let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
                payload.insert("external_id".to_string(), record.id.clone().into());
                for (key, value) in record.payload {
                    payload.insert(key, value.into());
                }

                PointStruct::new(point_uuid(&record.id), record.values, payload)
            })
            .collect();

        let upsert = UpsertPointsBuilder::new(&self.index, points);

        self.client
            .upsert_points(upsert)
            .await
            .map_err(|e| VectorStoreError::UpsertError(e.to_string()))?;

        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        limit: u64,
        min_score: Option<f32>,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let mut search_builder =
            SearchPointsBuilder::new(&self.index, vector, limit).with_payload(true);

        if let Some(score) = min_score {
            search_builder = search_builder.score_threshold(score);
        }

        let results = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| VectorStoreError::QueryError(e.to_string()))?;

        let search_results: Vec<SearchResult> = results
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload;

                let get_string = |key: &str| {
                    payload.get(key).and_then(|v| match &v.kind {
                        Some(qdrant_client::qdrant::value::Kind::StringValue(s)) => {
                            Some(s.clone())
                        }
                        _ => None,
                    })
                };

                let point_id = match &point.id {
                    Some(id) => match &id.point_id_options {
                        Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(uuid)) => {
                            uuid.clone()
                        }
                        Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(num)) => {
                            num.to_string()
                        }
                        None => String::new(),
                    },
                    None => String::new(),
                };

                SearchResult {
                    id: get_string("external_id").unwrap_or(point_id),
                    score: point.score,
                    content: get_string("content").unwrap_or_default(),
                    source: get_string("source").unwrap_or_default(),
                }
            })
            .collect();

        Ok(search_results)
    }

    fn name(&self) -> &str {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_uuid_is_deterministic() {
        let a = point_uuid("chunk_1");
        let b = point_uuid("chunk_1");
        let c = point_uuid("chunk_2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(parse_metric("cosine").unwrap(), Distance::Cosine);
        assert_eq!(parse_metric("Euclidean").unwrap(), Distance::Euclid);
        assert_eq!(parse_metric("dot").unwrap(), Distance::Dot);
        assert!(parse_metric("hamming").is_err());
    }
}
