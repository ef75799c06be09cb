use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use sql_chat::config::{AppConfig, CliArgs};
use sql_chat::db::SchemaCache;
use sql_chat::llm::create_provider;
use sql_chat::pipeline::Orchestrator;
use sql_chat::util::logging::init_tracing;
use sql_chat::web;
use sql_chat::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Initializing completion backend: {}", config.llm.backend);
    let llm = match create_provider(&config.llm) {
        Ok(llm) => llm,
        Err(e) => {
            error!("Failed to initialize completion backend: {}", e);
            return Err(e.into());
        }
    };
    let model_name = llm.model_name().to_string();

    info!(
        "Schema cache capacity: {} handles",
        config.database.schema_cache_capacity
    );
    let schema_cache = Arc::new(SchemaCache::new(config.database.schema_cache_capacity));
    let orchestrator = Arc::new(Orchestrator::new(
        llm,
        schema_cache,
        config.database.max_result_rows,
    )?);

    let app_state = Arc::new(AppState::new(config.clone(), orchestrator, model_name));

    // Database connections are opened per session from the chat page
    info!("Starting SQL chat server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
