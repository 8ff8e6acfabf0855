//! Text chunking with overlap for embedding.

use crate::models::{ChunkingConfig, Document, DocumentChunk};
use crate::utils::has_meaningful_content;

/// Splits document content into overlapping character-window chunks.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size as usize,
            overlap: config.chunk_overlap as usize,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&ChunkingConfig::default())
    }

    /// Chunk a document into overlapping segments, preserving order.
    pub fn chunk(&self, document: &Document) -> Vec<DocumentChunk> {
        let content = &document.content;

        if content.is_empty() {
            return Vec::new();
        }

        if content.len() <= self.chunk_size {
            return vec![DocumentChunk::from_document(
                document,
                content.clone(),
                0,
                1,
            )];
        }

        let pieces: Vec<String> = self
            .split_with_overlap(content)
            .into_iter()
            .filter(|piece| has_meaningful_content(piece))
            .collect();

        let total_chunks = pieces.len() as u32;

        pieces
            .into_iter()
            .enumerate()
            .map(|(idx, piece)| {
                DocumentChunk::from_document(document, piece, idx as u32, total_chunks)
            })
            .collect()
    }

    fn split_with_overlap(&self, content: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let chars: Vec<char> = content.chars().collect();
        let total_chars = chars.len();

        if total_chars == 0 {
            return pieces;
        }

        let step = if self.chunk_size > self.overlap {
            self.chunk_size - self.overlap
        } else {
            self.chunk_size
        };

        let mut start = 0;
        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            let adjusted_end = self.find_break_point(&chars, end, total_chars);

            pieces.push(chars[start..adjusted_end].iter().collect());

            if adjusted_end >= total_chars {
                break;
            }

            start += step;
            if start >= total_chars {
                break;
            }
        }

        pieces
    }

    /// Find a natural break point near the target end position.
    fn find_break_point(&self, chars: &[char], target_end: usize, total: usize) -> usize {
        if target_end >= total {
            return total;
        }

        // Look within the last 20% of the chunk
        let search_start = target_end.saturating_sub(self.chunk_size / 5);
        let search_range = &chars[search_start..target_end];

        // Priority: paragraph break > newline > sentence end > space
        let mut best_break = None;
        let mut last_newline = None;
        let mut last_sentence = None;
        let mut last_space = None;

        for (i, c) in search_range.iter().enumerate() {
            let pos = search_start + i;
            match c {
                '\n' => {
                    if i > 0 && search_range.get(i.saturating_sub(1)) == Some(&'\n') {
                        best_break = Some(pos + 1);
                    }
                    last_newline = Some(pos + 1);
                }
                '.' | '!' | '?' => {
                    if search_range.get(i + 1).is_some_and(|c| c.is_whitespace()) {
                        last_sentence = Some(pos + 1);
                    }
                }
                ' ' | '\t' => {
                    last_space = Some(pos + 1);
                }
                _ => {}
            }
        }

        best_break
            .or(last_newline)
            .or(last_sentence)
            .or(last_space)
            .unwrap_or(target_end)
    }
}

/// Assign positional IDs (`chunk_<n>`, 1-based) across one load operation.
///
/// Must run once over the full chunk list, immediately after splitting;
/// IDs are unique within the run only.
pub fn assign_chunk_ids(chunks: &mut [DocumentChunk]) {
    for (i, chunk) in chunks.iter_mut().enumerate() {
        chunk.id = format!("chunk_{}", i + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentMetadata;

    fn create_test_document(content: &str) -> Document {
        Document::new(
            content.to_string(),
            "/test.pdf".to_string(),
            "test_checksum".to_string(),
            DocumentMetadata::default(),
        )
    }

    #[test]
    fn test_small_document_single_chunk() {
        let chunker = TextChunker::with_defaults();
        let doc = create_test_document("Hello, world!");
        let chunks = chunker.chunk(&doc);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello, world!");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].total_chunks, 1);
    }

    #[test]
    fn test_empty_document() {
        let chunker = TextChunker::with_defaults();
        let doc = create_test_document("");
        let chunks = chunker.chunk(&doc);

        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunking_preserves_order_and_overlap() {
        let config = ChunkingConfig {
            chunk_size: 200,
            chunk_overlap: 40,
            ..Default::default()
        };
        let chunker = TextChunker::new(&config);

        let content = "a".repeat(1000);
        let doc = create_test_document(&content);
        let chunks = chunker.chunk(&doc);

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i as u32);
            assert_eq!(chunk.total_chunks, chunks.len() as u32);
        }
    }

    #[test]
    fn test_assign_chunk_ids() {
        let chunker = TextChunker::with_defaults();
        let doc_a = create_test_document("first document");
        let doc_b = create_test_document("second document");

        let mut chunks = chunker.chunk(&doc_a);
        chunks.extend(chunker.chunk(&doc_b));
        assign_chunk_ids(&mut chunks);

        assert_eq!(chunks[0].id, "chunk_1");
        assert_eq!(chunks[1].id, "chunk_2");

        let ids: std::collections::HashSet<_> = chunks.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), chunks.len());
    }

    #[test]
    fn test_assign_chunk_ids_is_rerun_stable() {
        let chunker = TextChunker::with_defaults();
        let doc = create_test_document("stable ids across reruns");

        let mut first = chunker.chunk(&doc);
        assign_chunk_ids(&mut first);
        let mut second = chunker.chunk(&doc);
        assign_chunk_ids(&mut second);

        let first_ids: Vec<_> = first.iter().map(|c| c.id.clone()).collect();
        let second_ids: Vec<_> = second.iter().map(|c| c.id.clone()).collect();
        assert_eq!(first_ids, second_ids);
    }
}
