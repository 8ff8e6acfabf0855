//! Embedding provider client.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::EmbeddingError;
use crate::models::EmbeddingConfig;

/// Maps batches of text to fixed-dimension vectors, one per input, in
/// input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty embedding response".to_string()))
    }

    fn dimension(&self) -> u32;
}

/// Request body for the /embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
    index: usize,
}

/// Client for OpenAI-compatible embedding endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimension: u32,
    request_dimensions: Option<u32>,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                EmbeddingError::ApiError("missing API key (set OPENAI_API_KEY)".to_string())
            })?;

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|e| EmbeddingError::ApiError(format!("invalid API key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| EmbeddingError::ConnectionError(e.to_string()))?;

        // Only the newer model family accepts an explicit output dimension.
        let request_dimensions = config
            .model
            .starts_with("text-embedding-3")
            .then_some(config.dimension);

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.url.trim_end_matches('/')),
            model: config.model.clone(),
            dimension: config.dimension,
            request_dimensions,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
            dimensions: self.request_dimensions,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout
                } else if e.is_connect() {
                    EmbeddingError::ConnectionError(e.to_string())
                } else {
                    EmbeddingError::RequestError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiError(format!(
                "status {}: {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        vectors_in_order(embed_response, texts.len())
    }

    fn dimension(&self) -> u32 {
        self.dimension
    }
}

/// Restore submission order from the response `index` field and enforce
/// the one-vector-per-input invariant.
fn vectors_in_order(
    mut response: EmbedResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if response.data.len() != expected {
        return Err(EmbeddingError::InvalidResponse(format!(
            "provider returned {} embeddings for {} inputs",
            response.data.len(),
            expected
        )));
    }
    response.data.sort_by_key(|entry| entry.index);
    Ok(response.data.into_iter().map(|entry| entry.embedding).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> EmbeddingConfig {
        EmbeddingConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let embedder = OpenAiEmbedder::new(&config_with_key());
        assert!(embedder.is_ok());
    }

    #[test]
    fn test_missing_api_key() {
        let config = EmbeddingConfig::default();
        assert!(OpenAiEmbedder::new(&config).is_err());
    }

    #[test]
    fn test_endpoint_trimming() {
        let config = EmbeddingConfig {
            url: "https://api.example.com/v1/".to_string(),
            ..config_with_key()
        };
        let embedder = OpenAiEmbedder::new(&config).unwrap();
        assert_eq!(embedder.endpoint(), "https://api.example.com/v1/embeddings");
    }

    #[test]
    fn test_dimensions_only_for_v3_models() {
        let embedder = OpenAiEmbedder::new(&config_with_key()).unwrap();
        assert_eq!(embedder.request_dimensions, None);

        let config = EmbeddingConfig {
            model: "text-embedding-3-small".to_string(),
            ..config_with_key()
        };
        let embedder = OpenAiEmbedder::new(&config).unwrap();
        assert_eq!(embedder.request_dimensions, Some(1536));
    }

    #[test]
    fn test_vectors_in_order_sorts_by_index() {
        let response = EmbedResponse {
            data: vec![
                EmbedData {
                    embedding: vec![2.0],
                    index: 1,
                },
                EmbedData {
                    embedding: vec![1.0],
                    index: 0,
                },
            ],
        };
        let vectors = vectors_in_order(response, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_vectors_in_order_rejects_length_mismatch() {
        let response = EmbedResponse {
            data: vec![EmbedData {
                embedding: vec![1.0],
                index: 0,
            }],
        };
        assert!(vectors_in_order(response, 2).is_err());
    }
}
