//! # Catalog Search
//!
//! Keeps the product search index in sync with the catalog's primary store
//! and serves product search.
//!
//! ## Architecture
//!
//! 1. **Server**: Receives Strapi webhooks and turns them into product events
//! 2. **Orchestrator**: Loads each product, maps it and writes it to the index
//! 3. **Processor**: Maps populated products into search documents
//! 4. **Search**: Resolves category scopes and runs queries for the HTTP surface
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`processor`]: Product to search document mapping
//! - [`resolver`]: Category closure resolution
//! - [`search`]: Query facade
//! - [`orchestrator`]: Sync entry points and the event loop
//! - [`notifier`]: Sync failure notifications
//! - [`rates`]: Currency rate cache
//! - [`server`]: HTTP routes
//! - [`errors`]: Error types for the service

pub mod config;
pub mod errors;
pub mod notifier;
pub mod orchestrator;
pub mod processor;
pub mod rates;
pub mod resolver;
pub mod search;
pub mod server;

pub use config::{Dependencies, Settings};
pub use errors::{NotifyError, QueryError, RateError, SyncError};
pub use orchestrator::{SyncOrchestrator, SyncOutcome};

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP server error.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Sync job error.
    #[error("Sync error: {0}")]
    SyncError(#[from] SyncError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::ServerError(msg.into())
    }
}

/// Initialize tracing/logging.
///
/// JSON output when `LOG_FORMAT=json`, pretty console output otherwise.
pub fn init_tracing(service_name: &'static str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("catalog_search=info,catalog_search_repository=info,catalog_store_repository=info")
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        tracing::info!(
            service_name = service_name,
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        tracing::info!(
            service_name = service_name,
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}
