use anyhow::Result;
use console::style;

use crate::cli::output::{StatusInfo, get_formatter};
use crate::models::{Config, IndexDriver, OutputFormat};
use crate::services::create_backend;

pub async fn handle_status(format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let (index_connected, index_exists, index_points) =
        match create_backend(&config.index, config.embedding.dimension) {
            Ok(index) => {
                let connected = index.health_check().await.unwrap_or(false);
                if connected {
                    match index.index_info().await {
                        Ok(Some(info)) => (true, true, info.points_count),
                        _ => (true, false, 0),
                    }
                } else {
                    (false, false, 0)
                }
            }
            Err(_) => (false, false, 0),
        };

    let status = StatusInfo {
        embedding_url: config.embedding.url.clone(),
        embedding_model: config.embedding.model.clone(),
        embedding_key_present: config.embedding.api_key.is_some(),
        index_driver: config.index.driver.to_string(),
        index_url: config.index.url.clone(),
        index_name: config.index.name.clone(),
        index_connected,
        index_exists,
        index_points,
    };

    print!("{}", formatter.format_status(&status));

    if !status.embedding_key_present || !index_connected {
        eprintln!();
        if !status.embedding_key_present {
            eprintln!(
                "{}",
                style("Hint: no embedding API key configured. Set OPENAI_API_KEY.").yellow()
            );
        }
        if !index_connected && config.index.driver == IndexDriver::Qdrant {
            eprintln!(
                "{}",
                style(format!(
                    "Warning: Qdrant not reachable at {}. Start it or adjust [index] url.",
                    config.index.url
                ))
                .yellow()
            );
        }
    }

    Ok(())
}
