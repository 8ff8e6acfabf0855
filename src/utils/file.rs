//! File utilities for ingestion.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Calculate SHA-256 checksum of content.
pub fn calculate_checksum(content: &str) -> String {
    let hash = Sha256::digest(content.as_bytes());
    hex::encode(hash)
}

/// Check whether a path looks like a PDF file.
pub fn is_pdf_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_calculate_checksum() {
        let checksum = calculate_checksum("hello world");
        assert_eq!(checksum.len(), 64); // SHA-256 produces 64 hex chars
        assert_eq!(checksum, calculate_checksum("hello world"));
        assert_ne!(checksum, calculate_checksum("hello worlds"));
    }

    #[test]
    fn test_is_pdf_file() {
        assert!(is_pdf_file(&PathBuf::from("report.pdf")));
        assert!(is_pdf_file(&PathBuf::from("REPORT.PDF")));
        assert!(!is_pdf_file(&PathBuf::from("report.txt")));
        assert!(!is_pdf_file(&PathBuf::from("report")));
    }
}
