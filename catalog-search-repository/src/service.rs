//! Search index service implementation.
//!
//! This module provides the main service for interacting with the search index.
//! The sync pipeline uses it to write documents and rebuild the index; the
//! query facade uses it to run translated searches and aggregations.
//!
//! # Note on Document Writes
//!
//! There is no partial update. Every write sends the complete document and
//! replaces whatever was indexed under the same product id.

use std::time::Instant;

use catalog_search_shared::{
    AggregationIntent, AggregationResponse, SearchDocument, SearchIntent, SearchPage,
};
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::config::{RebuildMode, SearchIndexServiceConfig};
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::{
    finalized_settings, get_bulk_load_index_definition, get_live_index_definition,
    get_versioned_index_name,
};
use crate::query::{
    build_aggregation_query, build_search_query, parse_aggregation_response,
    parse_search_response, CategoryScope,
};
use crate::types::{BatchOperationSummary, RebuildReport};

/// The main service for interacting with the search index.
///
/// Wraps a `SearchIndexProvider` and owns the policies around it: batch
/// sizing, whole-batch retries, the refresh/settings step that ends a bulk
/// load, and the two rebuild strategies.
///
/// # Example
///
/// ```no_run
/// use catalog_search_repository::{IndexConfig, OpenSearchProvider, SearchIndexService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = IndexConfig::new("products", false);
/// let provider = Box::new(OpenSearchProvider::new("http://localhost:9200", config).await?);
/// let service = SearchIndexService::new(provider);
///
/// // Creates the index on first start, leaves it alone afterwards
/// service.prepare().await?;
/// # Ok(())
/// # }
/// ```
pub struct SearchIndexService {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchIndexServiceConfig,
}

impl SearchIndexService {
    /// Create a new SearchIndexService with default configuration.
    ///
    /// The default configuration uses a batch size of 1000 documents.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexServiceConfig::default(),
        }
    }

    /// Create a new SearchIndexService with custom configuration.
    pub fn with_config(
        provider: Box<dyn SearchIndexProvider>,
        config: SearchIndexServiceConfig,
    ) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &SearchIndexServiceConfig {
        &self.config
    }

    /// The index or alias that per-document writes and searches target.
    pub fn alias(&self) -> &str {
        self.provider.alias()
    }

    /// Create the live index if it does not exist yet.
    ///
    /// Never drops anything, so it is safe to call on every start while
    /// lifecycle writes may be in flight.
    pub async fn prepare(&self) -> Result<bool, SearchIndexError> {
        let alias = self.provider.alias().to_string();
        let created = self
            .provider
            .create_index_if_missing(&alias, &get_live_index_definition(self.config.replicas))
            .await?;

        if created {
            info!(index = %alias, "Created missing search index");
        }
        Ok(created)
    }

    /// Write the full document for one product, replacing any previous version.
    pub async fn upsert(&self, document: &SearchDocument) -> Result<(), SearchIndexError> {
        self.provider.upsert_document(document).await
    }

    /// Remove the document of one product. An absent document is not an error.
    pub async fn remove(&self, product_id: i64) -> Result<(), SearchIndexError> {
        self.provider.delete_document(product_id).await
    }

    /// Write documents into `index` in batches of `batch_size`.
    ///
    /// Each batch is one bulk request. Per-document failures are logged with
    /// the product id and reported in the summary; they never fail sibling
    /// documents. A batch whose request fails as a whole is retried with a
    /// linear backoff, then all of its documents are reported failed and the
    /// next batch proceeds.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - One result per input document
    /// * `Err(SearchIndexError::ValidationError)` - If `batch_size` is zero
    #[instrument(skip(self, documents), fields(total = documents.len()))]
    pub async fn bulk_upsert(
        &self,
        index: &str,
        documents: &[SearchDocument],
        batch_size: usize,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if batch_size == 0 {
            return Err(SearchIndexError::validation("batch size must be positive"));
        }

        let mut summary = BatchOperationSummary::default();

        for (batch, chunk) in documents.chunks(batch_size).enumerate() {
            let batch_summary = self.submit_batch(index, batch, chunk).await;

            for result in batch_summary.results.iter().filter(|r| !r.success) {
                warn!(
                    product_id = result.product_id,
                    batch,
                    error = ?result.error,
                    "Failed to index document"
                );
            }

            summary.merge(batch_summary);
        }

        if summary.failed > 0 {
            warn!(
                index = %index,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Bulk upsert finished with failures"
            );
        } else {
            info!(index = %index, succeeded = summary.succeeded, "Bulk upsert finished");
        }

        Ok(summary)
    }

    async fn submit_batch(
        &self,
        index: &str,
        batch: usize,
        chunk: &[SearchDocument],
    ) -> BatchOperationSummary {
        let mut attempt: u32 = 0;

        loop {
            match self.provider.bulk_upsert_documents(index, chunk).await {
                Ok(summary) => return summary,
                Err(e) if attempt < self.config.max_batch_retries => {
                    attempt += 1;
                    warn!(
                        batch,
                        attempt,
                        error = %e,
                        "Bulk request failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Err(e) => {
                    error!(
                        batch,
                        documents = chunk.len(),
                        error = %e,
                        "Bulk request failed, giving up on batch"
                    );
                    return BatchOperationSummary::all_failed(chunk, &e);
                }
            }
        }
    }

    /// Apply live settings to `index` and make everything written searchable.
    pub async fn finalize(&self, index: &str) -> Result<(), SearchIndexError> {
        self.provider
            .update_index_settings(index, &finalized_settings(self.config.replicas))
            .await?;
        self.provider.refresh_index(index).await
    }

    /// Rebuild the index from a complete set of documents.
    ///
    /// Assumes exclusive ownership of the index for its duration. In
    /// `Recreate` mode the target is dropped first and is briefly empty. In
    /// `AliasSwap` mode the documents go into a fresh index that replaces the
    /// old one atomically; the swap is skipped if not a single document made
    /// it in.
    #[instrument(skip(self, documents), fields(total = documents.len(), mode = ?self.config.rebuild_mode))]
    pub async fn rebuild(
        &self,
        documents: &[SearchDocument],
    ) -> Result<RebuildReport, SearchIndexError> {
        let started = Instant::now();
        let alias = self.provider.alias().to_string();
        let batch_size = self.config.batch_size;
        let batches = documents.len().div_ceil(batch_size.max(1));

        let report = match self.config.rebuild_mode {
            RebuildMode::Recreate => {
                self.provider
                    .ensure_index_exists(&alias, &get_bulk_load_index_definition())
                    .await?;

                let summary = self.bulk_upsert(&alias, documents, batch_size).await?;
                self.finalize(&alias).await?;

                RebuildReport {
                    mode: RebuildMode::Recreate,
                    index: alias,
                    batches,
                    summary,
                    replaced_indices: Vec::new(),
                }
            }
            RebuildMode::AliasSwap => {
                let index = get_versioned_index_name(&alias, Utc::now());
                self.provider
                    .ensure_index_exists(&index, &get_bulk_load_index_definition())
                    .await?;

                let summary = self.bulk_upsert(&index, documents, batch_size).await?;
                if summary.total > 0 && summary.succeeded == 0 {
                    error!(index = %index, "No document was indexed, keeping the current index");
                    self.provider.delete_index(&index).await?;
                    return Err(SearchIndexError::bulk_index(format!(
                        "all {} documents failed, alias {} left unchanged",
                        summary.total, alias
                    )));
                }

                self.finalize(&index).await?;
                let replaced_indices = self.provider.swap_alias(&alias, &index).await?;

                for old_index in &replaced_indices {
                    if let Err(e) = self.provider.delete_index(old_index).await {
                        warn!(index = %old_index, error = %e, "Failed to delete replaced index");
                    }
                }

                RebuildReport {
                    mode: RebuildMode::AliasSwap,
                    index,
                    batches,
                    summary,
                    replaced_indices,
                }
            }
        };

        info!(
            index = %report.index,
            batches = report.batches,
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Index rebuild finished"
        );

        Ok(report)
    }

    /// Run one page of a search with a pre-resolved category scope.
    pub async fn search(
        &self,
        intent: &SearchIntent,
        scope: &CategoryScope,
    ) -> Result<SearchPage, SearchIndexError> {
        let body = build_search_query(intent, scope);
        let response = self.provider.search(&body).await?;

        parse_search_response(
            &response,
            intent.effective_page(),
            intent.effective_page_size(),
        )
    }

    /// Compute facets and per-currency price statistics with a pre-resolved category scope.
    pub async fn aggregate(
        &self,
        intent: &AggregationIntent,
        scope: &CategoryScope,
    ) -> Result<AggregationResponse, SearchIndexError> {
        let body = build_aggregation_query(intent, scope);
        let response = self.provider.search(&body).await?;

        parse_aggregation_response(&response)
    }
}
