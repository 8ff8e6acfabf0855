use serde::{Deserialize, Serialize};
use std::fmt;

use super::search::OutputFormat;

pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 1536;
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_INDEX_NAME: &str = "docvec";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    pub fn config_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|p| p.join("docvec").join("config.toml"))
    }

    /// Load the config file if present, then apply environment overrides.
    pub fn load() -> Result<Self, crate::error::ConfigError> {
        let mut config = if let Some(path) = Self::config_path()
            && path.exists()
        {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<(), crate::error::ConfigError> {
        let path = Self::config_path().ok_or_else(|| {
            crate::error::ConfigError::PathError("could not determine config directory".to_string())
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Secrets come from the environment when the file leaves them unset.
    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        if self.embedding.api_key.is_none() {
            self.embedding.api_key = get("OPENAI_API_KEY");
        }
        if self.index.api_key.is_none() {
            self.index.api_key = get("QDRANT_API_KEY");
        }
        if let Some(url) = get("QDRANT_URL") {
            self.index.url = url;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_url")]
    pub url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_embedding_dimension")]
    pub dimension: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_url() -> String {
    DEFAULT_EMBEDDING_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_embedding_dimension() -> u32 {
    DEFAULT_EMBEDDING_DIMENSION
}

fn default_timeout() -> u64 {
    120
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            api_key: None,
            dimension: default_embedding_dimension(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Which vector index backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexDriver {
    #[default]
    Qdrant,
    Memory,
}

impl fmt::Display for IndexDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexDriver::Qdrant => write!(f, "qdrant"),
            IndexDriver::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for IndexDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qdrant" => Ok(IndexDriver::Qdrant),
            "memory" => Ok(IndexDriver::Memory),
            _ => Err(format!("unknown index driver: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub driver: IndexDriver,

    #[serde(default = "default_qdrant_url")]
    pub url: String,

    #[serde(default = "default_index_name")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_metric")]
    pub metric: String,

    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
}

fn default_qdrant_url() -> String {
    DEFAULT_QDRANT_URL.to_string()
}

fn default_index_name() -> String {
    DEFAULT_INDEX_NAME.to_string()
}

fn default_metric() -> String {
    "cosine".to_string()
}

fn default_ready_timeout() -> u64 {
    60
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            driver: IndexDriver::default(),
            url: default_qdrant_url(),
            name: default_index_name(),
            api_key: None,
            metric: default_metric(),
            ready_timeout_secs: default_ready_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: u32,

    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_chunk_size() -> u32 {
    1000
}

fn default_chunk_overlap() -> u32 {
    200
}

fn default_batch_size() -> u32 {
    100
}

fn default_max_file_size() -> u64 {
    50 * 1024 * 1024
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            batch_size: default_batch_size(),
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    #[serde(default)]
    pub default_format: OutputFormat,

    #[serde(default)]
    pub default_min_score: Option<f32>,
}

fn default_limit() -> u32 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_format: OutputFormat::Text,
            default_min_score: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.embedding.url, DEFAULT_EMBEDDING_URL);
        assert_eq!(config.embedding.dimension, 1536);
        assert_eq!(config.index.url, DEFAULT_QDRANT_URL);
        assert_eq!(config.index.name, DEFAULT_INDEX_NAME);
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.chunking.batch_size, 100);
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path();
        assert!(path.is_some());
    }

    #[test]
    fn test_apply_env_fills_missing_keys() {
        let mut config = Config::default();
        config.apply_env_from(|key| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "QDRANT_API_KEY" => Some("qd-test".to_string()),
            _ => None,
        });
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.index.api_key.as_deref(), Some("qd-test"));
    }

    #[test]
    fn test_apply_env_keeps_file_values() {
        let mut config = Config::default();
        config.embedding.api_key = Some("from-file".to_string());
        config.apply_env_from(|_| Some("from-env".to_string()));
        assert_eq!(config.embedding.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_index_driver_parse() {
        assert_eq!("qdrant".parse::<IndexDriver>().unwrap(), IndexDriver::Qdrant);
        assert_eq!("Memory".parse::<IndexDriver>().unwrap(), IndexDriver::Memory);
        assert!("redis".parse::<IndexDriver>().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[chunking]\nchunk_size = 500\n").unwrap();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.embedding.model, DEFAULT_EMBEDDING_MODEL);
    }
}
