//! Dependency initialization and wiring for the catalog search service.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::settings::{ConnectionMode, Settings};
use crate::notifier::{FailureNotifier, LogNotifier, WebhookNotifier};
use crate::orchestrator::SyncOrchestrator;
use crate::rates::{CurrencyRateCache, FixerRateSource};
use crate::resolver::CategoryClosureResolver;
use crate::search::CatalogSearch;
use crate::IndexingError;
use catalog_search_repository::{IndexConfig, OpenSearchProvider, SearchIndexService};
use catalog_store_repository::{PostgresPrimaryStore, PrimaryStore};

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub settings: Settings,
    pub index: Arc<SearchIndexService>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub search: Arc<CatalogSearch>,
    /// Present only when a rate source API key is configured.
    pub rates: Option<Arc<CurrencyRateCache>>,
}

impl Dependencies {
    /// Initialize all dependencies from the given settings.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails (OpenSearch only in fail-fast mode)
    pub async fn new(settings: Settings) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            index_alias = %settings.index_alias,
            connection_mode = ?settings.connection_mode,
            retry_interval_secs = settings.retry_interval.as_secs(),
            batch_size = settings.batch_size,
            rebuild_mode = ?settings.rebuild_mode,
            version_fencing = settings.version_fencing,
            "Initializing dependencies"
        );

        let index_config = IndexConfig::new(settings.index_alias.clone(), settings.version_fencing);

        // Initialize OpenSearch provider with retry logic
        let search_provider = Self::connect_to_opensearch(
            &settings.opensearch_url,
            index_config,
            settings.connection_mode,
            settings.retry_interval,
        )
        .await?;

        info!("OpenSearch connection established");

        let index = Arc::new(SearchIndexService::with_config(
            Box::new(search_provider),
            settings.index_service_config(),
        ));

        let store: Arc<dyn PrimaryStore> = Arc::new(
            PostgresPrimaryStore::connect(&settings.database_url)
                .await
                .map_err(|e| IndexingError::config(format!("Failed to connect to primary store: {}", e)))?,
        );

        info!("Primary store connection established");

        let notifier: Arc<dyn FailureNotifier> = match &settings.sync_failure_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone()).map_err(|e| {
                IndexingError::config(format!("Failed to create failure notifier: {}", e))
            })?),
            None => Arc::new(LogNotifier),
        };

        let rates = match &settings.fixer_api_key {
            Some(api_key) => {
                let source = FixerRateSource::new(settings.fixer_base_url.clone(), api_key.clone())
                    .map_err(|e| IndexingError::config(format!("Failed to create rate source: {}", e)))?;
                Some(Arc::new(CurrencyRateCache::new(Arc::new(source), settings.rates_ttl)))
            }
            None => {
                warn!("FIXER_API_KEY is not set, currency rates are disabled");
                None
            }
        };

        let search = Arc::new(CatalogSearch::new(
            index.clone(),
            CategoryClosureResolver::new(store.clone()),
        ));
        let orchestrator = Arc::new(SyncOrchestrator::new(store, index.clone(), notifier));

        Ok(Self {
            settings,
            index,
            orchestrator,
            search,
            rates,
        })
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        index_config: IndexConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchProvider, IndexingError> {
        loop {
            match OpenSearchProvider::new(url, index_config.clone()).await {
                Ok(provider) => return Ok(provider),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(IndexingError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }
}
