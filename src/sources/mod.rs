//! Document sources.

pub mod pdf;

pub use pdf::{collect_pdf_files, load_document};
