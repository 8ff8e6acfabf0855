//! CLI module for docvec.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Ingest PDF documents into a vector index and search them.
#[derive(Debug, Parser)]
#[command(name = "docvec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(
        long,
        short = 'f',
        global = true,
        help = "Output format: text, json, or markdown"
    )]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check embedding provider and vector index status
    Status,

    /// Ingest PDF files or directories into the vector index
    Ingest(commands::IngestArgs),

    /// Import documents from JSON/JSONL files
    Import(commands::ImportArgs),

    /// Search indexed content
    Search(commands::SearchArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
