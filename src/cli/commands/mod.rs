mod config;
mod import;
mod ingest;
mod search;
mod status;

pub use config::ConfigCommand;
pub use import::ImportArgs;
pub use ingest::IngestArgs;
pub use search::SearchArgs;

pub use config::handle_config;
pub use import::handle_import;
pub use ingest::handle_ingest;
pub use search::handle_search;
pub use status::handle_status;
