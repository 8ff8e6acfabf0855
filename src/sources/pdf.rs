//! PDF document loading.
//!
//! Text extraction is delegated to the `pdf-extract` crate; this module
//! only wraps it into [`Document`] records and discovers PDF files on
//! disk.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::ChunkingError;
use crate::models::{Document, DocumentMetadata};
use crate::utils::{calculate_checksum, is_pdf_file};

/// Extract a PDF file into a [`Document`].
pub fn load_document(path: &Path, max_file_size: u64) -> Result<Document, ChunkingError> {
    let file_meta = fs::metadata(path)?;
    if file_meta.len() > max_file_size {
        return Err(ChunkingError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "file exceeds maximum size: {} > {}",
                file_meta.len(),
                max_file_size
            ),
        )));
    }

    let content = pdf_extract::extract_text(path).map_err(|e| ChunkingError::ExtractError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(ChunkingError::EmptyDocument(path.display().to_string()));
    }

    let checksum = calculate_checksum(&content);
    let metadata = DocumentMetadata {
        filename: path
            .file_name()
            .map(|name| name.to_string_lossy().to_string()),
        title: None,
        size_bytes: file_meta.len(),
    };

    Ok(Document::new(
        content,
        path.display().to_string(),
        checksum,
        metadata,
    ))
}

/// Collect PDF files from a file or directory path, in sorted order.
pub fn collect_pdf_files(path: &Path) -> Result<Vec<PathBuf>, ChunkingError> {
    if path.is_file() {
        if is_pdf_file(path) {
            return Ok(vec![path.to_path_buf()]);
        }
        return Err(ChunkingError::NoPdfsFound(path.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry.map_err(|e| ChunkingError::WalkError(e.to_string()))?;
        if entry.path().is_file() && is_pdf_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    if files.is_empty() {
        return Err(ChunkingError::NoPdfsFound(path.display().to_string()));
    }

    files.sort();
    Ok(files)
}
