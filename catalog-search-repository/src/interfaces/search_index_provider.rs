//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use catalog_search_shared::SearchDocument;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;

/// Abstracts the underlying search engine.
///
/// Implementations are injected into `SearchIndexService` so the service can
/// be exercised against mocks. Single-document writes and searches target the
/// provider's alias; index lifecycle operations take an explicit index name
/// because a rebuild may write into an index the alias does not point to yet.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// The index or alias that per-document writes and searches target.
    fn alias(&self) -> &str;

    /// Check whether an index (or alias) with this name exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Create the index with the given settings and mappings unless it already exists.
    ///
    /// Returns `true` if the index was created.
    async fn create_index_if_missing(
        &self,
        index: &str,
        definition: &Value,
    ) -> Result<bool, SearchIndexError>;

    /// Drop the index if it exists, then create it with the given settings and mappings.
    ///
    /// Destructive: documents written concurrently are lost. Only the rebuild
    /// job may call this.
    async fn ensure_index_exists(
        &self,
        index: &str,
        definition: &Value,
    ) -> Result<(), SearchIndexError>;

    /// Delete an index. An absent index is not an error.
    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Write a full document, replacing any previous version with the same id.
    async fn upsert_document(&self, document: &SearchDocument) -> Result<(), SearchIndexError>;

    /// Delete a document by product id. A missing document is considered deleted.
    async fn delete_document(&self, product_id: i64) -> Result<(), SearchIndexError>;

    /// Submit documents as one bulk request and report per-document outcomes.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - The request was processed; individual
    ///   documents may still have failed
    /// * `Err(SearchIndexError)` - The request as a whole failed
    async fn bulk_upsert_documents(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Make everything written so far searchable.
    async fn refresh_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Apply dynamic index settings (replicas, refresh interval).
    async fn update_index_settings(
        &self,
        index: &str,
        settings: &Value,
    ) -> Result<(), SearchIndexError>;

    /// Atomically point `alias` at `new_index` only.
    ///
    /// Returns the indices the alias pointed to before, excluding `new_index`.
    async fn swap_alias(&self, alias: &str, new_index: &str)
        -> Result<Vec<String>, SearchIndexError>;

    /// Run a search or aggregation body against the alias and return the raw response.
    async fn search(&self, body: &Value) -> Result<Value, SearchIndexError>;
}
