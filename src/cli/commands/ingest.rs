//! Ingest command implementation.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::cli::output::{IngestStats, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{
    OpenAiEmbedder, TextChunker, UpsertPipeline, assign_chunk_ids, create_backend, ensure_ready,
};
use crate::sources::{collect_pdf_files, load_document};

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// PDF file or directory of PDF files to ingest
    #[arg(required = true)]
    pub path: PathBuf,

    /// Override the embed/upsert batch size
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Show what would be ingested without actually ingesting
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle_ingest(args: IngestArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);
    let start_time = Instant::now();

    let path = args.path.canonicalize().context("invalid path")?;
    let files = collect_pdf_files(&path)?;

    if verbose {
        println!("Found {} PDF files to process", files.len());
    }

    if args.dry_run {
        println!(
            "{}",
            formatter.format_message(&format!("Dry run: Would ingest {} files", files.len()))
        );
        for file in &files {
            println!("  {}", file.display());
        }
        return Ok(());
    }

    let mut stats = IngestStats {
        files_scanned: files.len() as u64,
        ..Default::default()
    };

    let chunker = TextChunker::new(&config.chunking);
    let mut chunks = Vec::new();

    for file_path in &files {
        let document = match load_document(file_path, config.chunking.max_file_size) {
            Ok(doc) => doc,
            Err(e) => {
                if verbose {
                    println!("Skipping {}: {}", file_path.display(), e);
                }
                stats.files_skipped += 1;
                continue;
            }
        };

        chunks.extend(chunker.chunk(&document));
        stats.files_loaded += 1;
    }

    if stats.files_loaded == 0 {
        anyhow::bail!("no documents could be loaded from {}", path.display());
    }

    // IDs are positional across the whole load, so assign them once over
    // the full chunk list.
    assign_chunk_ids(&mut chunks);
    stats.chunks_created = chunks.len() as u64;

    if chunks.is_empty() {
        println!("{}", formatter.format_message("No chunks to ingest."));
        return Ok(());
    }

    let embedder = OpenAiEmbedder::new(&config.embedding)?;
    let index = create_backend(&config.index, config.embedding.dimension)?;
    ensure_ready(
        index.as_ref(),
        Duration::from_secs(config.index.ready_timeout_secs),
    )
    .await?;

    let batch_size = args
        .batch_size
        .unwrap_or(config.chunking.batch_size)
        .max(1) as usize;
    let total_batches = chunks.len().div_ceil(batch_size) as u64;

    let pb = ProgressBar::new(total_batches);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] batch {pos}/{len} ({eta})",
            )
            .unwrap()
            .progress_chars("#>-"),
    );

    let bar = pb.clone();
    let pipeline = UpsertPipeline::new(&embedder)
        .with_batch_size(batch_size)
        .with_progress(move |done, _total| bar.set_position(u64::from(done)));

    let report = match pipeline.run(index.as_ref(), &chunks).await {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
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

    pb.finish_and_clear();
    stats.batches_committed = report.batches_committed;
    stats.duration_ms = start_time.elapsed().as_millis() as u64;
    print!("{}", formatter.format_ingest_stats(&stats));

    Ok(())
}
