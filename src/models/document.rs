use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    /// File path or import identifier the content came from.
    pub source: String,
    pub metadata: DocumentMetadata,
    pub checksum: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub filename: Option<String>,
    pub title: Option<String>,
    pub size_bytes: u64,
}

/// One contiguous slice of a document, the unit submitted to the
/// embed-and-upsert pipeline.
///
/// `id` is positional (`chunk_<n>`, 1-based across one load operation) and
/// is assigned by `assign_chunk_ids` immediately after splitting — it is
/// not a content hash, so re-chunking with different parameters produces
/// different IDs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub source: String,
    pub checksum: String,
    pub created_at: String,
}

impl Document {
    pub fn generate_id(source: &str) -> String {
        use sha2::{Digest, Sha256};
        let hash = Sha256::digest(source.as_bytes());
        hex::encode(&hash[..16])
    }

    pub fn new(content: String, source: String, checksum: String, metadata: DocumentMetadata) -> Self {
        let id = Self::generate_id(&source);
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id,
            content,
            source,
            metadata,
            checksum,
            created_at: now,
        }
    }
}

impl DocumentChunk {
    /// Build a chunk from its parent document. The positional `id` is left
    /// empty until `assign_chunk_ids` runs over the full load.
    pub fn from_document(
        document: &Document,
        content: String,
        chunk_index: u32,
        total_chunks: u32,
    ) -> Self {
        Self {
            id: String::new(),
            document_id: document.id.clone(),
            content,
            chunk_index,
            total_chunks,
            source: document.source.clone(),
            checksum: document.checksum.clone(),
            created_at: document.created_at.clone(),
        }
    }
}

/// Coerce arbitrary JSON content to text. Non-string content is
/// stringified, never rejected.
pub fn coerce_content(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
