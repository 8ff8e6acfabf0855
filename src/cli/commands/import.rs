//! Import command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cli::output::{IngestStats, get_formatter};
use crate::models::{Config, Document, DocumentMetadata, OutputFormat, coerce_content};
use crate::services::{
    OpenAiEmbedder, TextChunker, UpsertPipeline, assign_chunk_ids, create_backend, ensure_ready,
};
use crate::utils::calculate_checksum;

/// Arguments for the import command.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to JSON or JSONL file (use - for stdin)
    #[arg()]
    pub file: Option<PathBuf>,

    /// Only validate the import file without indexing
    #[arg(long)]
    pub validate_only: bool,
}

/// JSON import document format. `content` accepts any JSON value; it is
/// string-coerced, never rejected.
#[derive(Debug, Deserialize)]
pub struct ImportDocument {
    pub content: serde_json::Value,
    pub source: Option<String>,
    pub title: Option<String>,
}

pub async fn handle_import(args: ImportArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);
    let start_time = Instant::now();

    let input = read_input(args.file.as_deref())?;
    let import_docs = parse_import_documents(&input)?;

    if import_docs.is_empty() {
        println!(
            "{}",
            formatter.format_message("No documents found in input.")
        );
        return Ok(());
    }

    if verbose || args.validate_only {
        println!("Found {} documents to import", import_docs.len());
    }

    if args.validate_only {
        println!(
            "{}",
            formatter.format_message(&format!(
                "Validation successful: {} documents ready for import",
                import_docs.len()
            ))
        );
        return Ok(());
    }

    let mut stats = IngestStats {
        files_scanned: import_docs.len() as u64,
        ..Default::default()
    };

    let chunker = TextChunker::new(&config.chunking);
    let mut chunks = Vec::new();

    for (i, import_doc) in import_docs.into_iter().enumerate() {
        let content = coerce_content(&import_doc.content);
        if content.is_empty() {
            stats.files_skipped += 1;
            continue;
        }

        let source = import_doc
            .source
            .unwrap_or_else(|| format!("import:{}", i + 1));
        let checksum = calculate_checksum(&content);
        let metadata = DocumentMetadata {
            filename: None,
            title: import_doc.title,
            size_bytes: content.len() as u64,
        };

        let document = Document::new(content, source, checksum, metadata);
        chunks.extend(chunker.chunk(&document));
        stats.files_loaded += 1;
    }

    assign_chunk_ids(&mut chunks);
    stats.chunks_created = chunks.len() as u64;

    if chunks.is_empty() {
        println!("{}", formatter.format_message("No chunks to import."));
        return Ok(());
    }

    let embedder = OpenAiEmbedder::new(&config.embedding)?;
    let index = create_backend(&config.index, config.embedding.dimension)?;
    ensure_ready(
        index.as_ref(),
        Duration::from_secs(config.index.ready_timeout_secs),
    )
    .await?;

    let pipeline =
        UpsertPipeline::new(&embedder).with_batch_size(config.chunking.batch_size.max(1) as usize);

    let report = match pipeline.run(index.as_ref(), &chunks).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!(
                "{}",
                formatter.format_error(&format!(
                    "{} (details in {})",
                    e,
                    pipeline.error_log().display()
                ))
            );
            return Err(e.into());
        }
    };

    stats.batches_committed = report.batches_committed;
    stats.duration_ms = start_time.elapsed().as_millis() as u64;
    print!("{}", formatter.format_ingest_stats(&stats));

    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path.to_string_lossy() != "-" => {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

/// Parse a JSON array or JSONL input into import documents.
fn parse_import_documents(input: &str) -> Result<Vec<ImportDocument>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("failed to parse JSON array");
    }

    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("failed to parse line {}", i + 1))
        })
        .collect()
}
