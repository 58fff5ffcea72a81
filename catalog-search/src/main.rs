//! Catalog Search Main Entry Point
//!
//! Serves product search and keeps the index in sync with the catalog: Strapi
//! webhooks are queued as product events and applied by the orchestrator.

use catalog_search::server::{create_app, run_server, state::AppState};
use catalog_search::{init_tracing, Dependencies, IndexingError, Settings};
use dotenv::dotenv;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing("catalog-search");

    info!("Starting catalog search service");

    let settings = Settings::from_env()?;
    let http_addr = settings.http_addr;
    let channel_size = settings.event_channel_size;

    let deps = match Dependencies::new(settings).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    // Never drops an existing index; lifecycle writes may already be flowing
    deps.index
        .prepare()
        .await
        .map_err(|e| IndexingError::config(format!("Failed to prepare search index: {}", e)))?;

    let (event_sender, event_receiver) = mpsc::channel(channel_size);

    let orchestrator = deps.orchestrator.clone();
    let orchestrator_handle = tokio::spawn(async move {
        orchestrator.run(event_receiver).await;
    });

    let app = create_app(AppState {
        search: deps.search.clone(),
        rates: deps.rates.clone(),
        event_sender,
        webhook_token: deps.settings.webhook_token.clone(),
    });

    let result = run_server(app, http_addr).await;

    // The router owned the only sender; dropping it lets the orchestrator drain and stop
    if let Err(e) = orchestrator_handle.await {
        error!(error = %e, "Orchestrator task terminated abnormally");
    }

    match result {
        Ok(()) => {
            info!("Catalog search service stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Catalog search service failed");
            Err(e)
        }
    }
}
