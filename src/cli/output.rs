use std::fmt::Write as FmtWrite;

use crate::models::{OutputFormat, SearchResults};

pub trait Formatter {
    fn format_search_results(&self, results: &SearchResults) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_ingest_stats(&self, stats: &IngestStats) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub embedding_url: String,
    pub embedding_model: String,
    pub embedding_key_present: bool,
    pub index_driver: String,
    pub index_url: String,
    pub index_name: String,
    pub index_connected: bool,
    pub index_exists: bool,
    pub index_points: u64,
}

#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub files_scanned: u64,
    pub files_loaded: u64,
    pub files_skipped: u64,
    pub chunks_created: u64,
    pub batches_committed: u32,
    pub duration_ms: u64,
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_search_results(&self, results: &SearchResults) -> String {
        if results.is_empty() {
            return format!("No results found for: {}\n", results.query);
        }

        let mut output = String::new();
        writeln!(output, "Search results for: \"{}\"", results.query).unwrap();
        writeln!(
            output,
            "Found {} results in {}ms\n",
            results.total, results.duration_ms
        )
        .unwrap();

        for (i, result) in results.results.iter().enumerate() {
            writeln!(output, "{}. [Score: {:.3}] {}", i + 1, result.score, result.id).unwrap();
            writeln!(output, "   Source: {}", result.source).unwrap();
            writeln!(output, "   ---").unwrap();

            let preview: String = result.content.chars().take(200).collect();
            let preview = if result.content.chars().count() > 200 {
                format!("{}...", preview)
            } else {
                preview
            };
            for line in preview.lines() {
                writeln!(output, "   {}", line).unwrap();
            }
            writeln!(output).unwrap();
        }

        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Status").unwrap();
        writeln!(output, "------").unwrap();

        let key_status = if status.embedding_key_present {
            "[SET]"
        } else {
            "[MISSING]"
        };
        writeln!(output, "Embedding:     {}", status.embedding_model).unwrap();
        writeln!(output, "  URL:         {}", status.embedding_url).unwrap();
        writeln!(output, "  API key:     {}", key_status).unwrap();
        writeln!(output).unwrap();

        let index_status = if status.index_connected {
            "[CONNECTED]"
        } else {
            "[DISCONNECTED]"
        };
        writeln!(
            output,
            "Vector Index:  {} ({})",
            status.index_driver, index_status
        )
        .unwrap();
        if status.index_connected {
            writeln!(output, "  URL:         {}", status.index_url).unwrap();
            writeln!(output, "  Index:       {}", status.index_name).unwrap();
            if status.index_exists {
                writeln!(output, "  Points:      {}", status.index_points).unwrap();
            } else {
                writeln!(output, "  Points:      (index not created yet)").unwrap();
            }
        }

        output
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        let mut output = String::new();
        writeln!(output, "Ingest Complete").unwrap();
        writeln!(output, "---------------").unwrap();
        writeln!(output, "Files scanned: {}", stats.files_scanned).unwrap();
        writeln!(output, "Files loaded: {}", stats.files_loaded).unwrap();
        writeln!(output, "Files skipped: {}", stats.files_skipped).unwrap();
        writeln!(output, "Chunks upserted: {}", stats.chunks_created).unwrap();
        writeln!(output, "Batches committed: {}", stats.batches_committed).unwrap();
        writeln!(output, "Duration: {}ms", stats.duration_ms).unwrap();
        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}\n", error)
    }
}

pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, json: &serde_json::Value) -> String {
        if self.pretty {
            serde_json::to_string_pretty(json).unwrap()
        } else {
            serde_json::to_string(json).unwrap()
        }
    }
}

impl Formatter for JsonFormatter {
    fn format_search_results(&self, results: &SearchResults) -> String {
        if self.pretty {
            serde_json::to_string_pretty(results)
                .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        } else {
            serde_json::to_string(results).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        }
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let json = serde_json::json!({
            "embedding": {
                "url": status.embedding_url,
                "model": status.embedding_model,
                "api_key_present": status.embedding_key_present,
            },
            "index": {
                "driver": status.index_driver,
                "url": status.index_url,
                "name": status.index_name,
                "connected": status.index_connected,
                "exists": status.index_exists,
                "points": status.index_points,
            }
        });

        self.render(&json)
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        let json = serde_json::json!({
            "files_scanned": stats.files_scanned,
            "files_loaded": stats.files_loaded,
            "files_skipped": stats.files_skipped,
            "chunks_upserted": stats.chunks_created,
            "batches_committed": stats.batches_committed,
            "duration_ms": stats.duration_ms,
        });

        self.render(&json)
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({"message": message}).to_string()
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({"error": error}).to_string()
    }
}

pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn format_search_results(&self, results: &SearchResults) -> String {
        if results.is_empty() {
            return format!("## No results found\n\nQuery: `{}`\n", results.query);
        }

        let mut output = String::new();
        writeln!(output, "## Search Results\n").unwrap();
        writeln!(output, "**Query:** `{}`\n", results.query).unwrap();
        writeln!(
            output,
            "Found {} results in {}ms\n",
            results.total, results.duration_ms
        )
        .unwrap();

        for (i, result) in results.results.iter().enumerate() {
            writeln!(output, "### {}. Score: {:.3}\n", i + 1, result.score).unwrap();
            writeln!(output, "**Source:** `{}`\n", result.source).unwrap();
            writeln!(output, "```").unwrap();
            writeln!(output, "{}", result.content).unwrap();
            writeln!(output, "```\n").unwrap();
        }

        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "## Status\n").unwrap();

        writeln!(output, "### Embedding\n").unwrap();
        writeln!(output, "- **Model:** {}", status.embedding_model).unwrap();
        writeln!(output, "- **URL:** `{}`", status.embedding_url).unwrap();
        writeln!(
            output,
            "- **API key:** {}",
            if status.embedding_key_present {
                "set"
            } else {
                "missing"
            }
        )
        .unwrap();
        writeln!(output).unwrap();

        let index_status = if status.index_connected { "✅" } else { "❌" };
        writeln!(
            output,
            "### Vector Index ({}) {}\n",
            status.index_driver, index_status
        )
        .unwrap();
        writeln!(output, "- **URL:** `{}`", status.index_url).unwrap();
        writeln!(output, "- **Index:** {}", status.index_name).unwrap();
        writeln!(output, "- **Points:** {}", status.index_points).unwrap();

        output
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        let mut output = String::new();
        writeln!(output, "## Ingest Complete\n").unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Files scanned | {} |", stats.files_scanned).unwrap();
        writeln!(output, "| Files loaded | {} |", stats.files_loaded).unwrap();
        writeln!(output, "| Files skipped | {} |", stats.files_skipped).unwrap();
        writeln!(output, "| Chunks upserted | {} |", stats.chunks_created).unwrap();
        writeln!(
            output,
            "| Batches committed | {} |",
            stats.batches_committed
        )
        .unwrap();
        writeln!(output, "| Duration | {}ms |", stats.duration_ms).unwrap();
        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("> {}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("> ⚠️ **Error:** {}\n", error)
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter),
    }
}
