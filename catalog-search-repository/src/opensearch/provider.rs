//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use std::time::Duration;

use async_trait::async_trait;
use catalog_search_shared::SearchDocument;
use opensearch::{
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{
        IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesGetAliasParts,
        IndicesPutSettingsParts, IndicesRefreshParts,
    },
    params::VersionType,
    BulkParts, DeleteParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::bulk::{build_bulk_body, parse_bulk_response};
use crate::opensearch::index_config::IndexConfig;
use crate::types::BatchOperationSummary;

/// Request timeout applied to every call to the engine.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenSearch provider implementation.
///
/// # Example
///
/// ```ignore
/// use catalog_search_repository::{IndexConfig, OpenSearchProvider};
/// let config = IndexConfig::new("products", false);
/// let provider = OpenSearchProvider::new("http://localhost:9200", config).await?;
///
/// // Creates the document or replaces the previous version with the same id
/// provider.upsert_document(&document).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// The engine is pinged once so that an unreachable cluster is reported
    /// here rather than on the first write.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index configuration containing alias and fencing mode
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        let response = client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;
        if !response.status_code().is_success() {
            return Err(SearchIndexError::connection(format!(
                "Ping failed with status {}",
                response.status_code()
            )));
        }

        info!(
            url = %url,
            alias = %index_config.alias,
            version_fencing = index_config.version_fencing,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Read the body of a failed response for error reporting.
    async fn failure_body(response: Response) -> String {
        response.text().await.unwrap_or_default()
    }

    async fn create_index(&self, index: &str, definition: &Value) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(definition.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::index_lifecycle(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Create index request failed");
            return Err(SearchIndexError::index_lifecycle(format!(
                "Create index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Index created");
        Ok(())
    }

    /// Indices the alias currently points to. Empty if the alias does not exist.
    async fn alias_targets(&self, alias: &str) -> Result<Vec<String>, SearchIndexError> {
        let response = self
            .client
            .indices()
            .get_alias(IndicesGetAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| SearchIndexError::alias(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            return Err(SearchIndexError::alias(format!(
                "Get alias {} failed with status {}: {}",
                alias, status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(body
            .as_object()
            .map(|indices| indices.keys().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    fn alias(&self) -> &str {
        &self.index_config.alias
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchIndexError::index_lifecycle(format!(
                "Index exists check for {} returned status {}",
                index, status
            ))),
        }
    }

    async fn create_index_if_missing(
        &self,
        index: &str,
        definition: &Value,
    ) -> Result<bool, SearchIndexError> {
        if self.index_exists(index).await? {
            debug!(index = %index, "Index already exists");
            return Ok(false);
        }

        self.create_index(index, definition).await?;
        Ok(true)
    }

    async fn ensure_index_exists(
        &self,
        index: &str,
        definition: &Value,
    ) -> Result<(), SearchIndexError> {
        // An alias left by an alias-swap rebuild cannot be deleted by name.
        let targets = self.alias_targets(index).await?;
        for target in &targets {
            warn!(index = %target, alias = %index, "Dropping aliased index before recreate");
            self.delete_index(target).await?;
        }

        if targets.is_empty() && self.index_exists(index).await? {
            warn!(index = %index, "Dropping existing index before recreate");
            self.delete_index(index).await?;
        }

        self.create_index(index, definition).await
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_lifecycle(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - index may already be gone
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Delete index request failed");
            return Err(SearchIndexError::index_lifecycle(format!(
                "Delete index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Index deleted");
        Ok(())
    }

    /// Write the full document under its product id.
    ///
    /// No refresh is forced; the document becomes searchable on the index's
    /// regular refresh interval.
    async fn upsert_document(&self, document: &SearchDocument) -> Result<(), SearchIndexError> {
        let doc_id = document.document_id();
        let body = serde_json::to_value(document)
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        let mut request = self
            .client
            .index(IndexParts::IndexId(&self.index_config.alias, &doc_id))
            .body(body);

        let fenced_version = if self.index_config.version_fencing {
            document.version()
        } else {
            None
        };
        if let Some(version) = fenced_version {
            request = request.version(version).version_type(VersionType::External);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchIndexError::index_write(e.to_string()))?;

        let status = response.status_code();
        if fenced_version.is_some() && status.as_u16() == 409 {
            debug!(doc_id = %doc_id, "Skipped stale document version");
            return Ok(());
        }
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::index_write(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(doc_id = %doc_id, "Document indexed");
        Ok(())
    }

    /// Delete a document from the search index.
    ///
    /// If the document doesn't exist, the operation is considered successful.
    async fn delete_document(&self, product_id: i64) -> Result<(), SearchIndexError> {
        let doc_id = product_id.to_string();

        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index_config.alias, &doc_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = Self::failure_body(response).await;
            error!(status = %status, body = %error_body, "Delete request failed");
            return Err(SearchIndexError::delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(doc_id = %doc_id, "Document deleted");
        Ok(())
    }

    async fn bulk_upsert_documents(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }

        let body: Vec<JsonBody<Value>> =
            build_bulk_body(index, documents, self.index_config.version_fencing)?
                .into_iter()
                .map(JsonBody::from)
                .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_index(format!(
                "Bulk failed with status {}: {}",
                status, error_body
            )));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(parse_bulk_response(
            &result,
            documents,
            self.index_config.version_fencing,
        ))
    }

    async fn refresh_index(&self, index: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::settings(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Refresh request failed");
            return Err(SearchIndexError::settings(format!(
                "Refresh of {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        debug!(index = %index, "Index refreshed");
        Ok(())
    }

    async fn update_index_settings(
        &self,
        index: &str,
        settings: &Value,
    ) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .put_settings(IndicesPutSettingsParts::Index(&[index]))
            .body(settings.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::settings(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(index = %index, status = %status, body = %error_body, "Update settings request failed");
            return Err(SearchIndexError::settings(format!(
                "Update settings of {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Index settings updated");
        Ok(())
    }

    /// Repoint the alias in one atomic `_aliases` call.
    ///
    /// A concrete index occupying the alias name (left by a `recreate` rebuild)
    /// is removed in the same call so the alias can take its place; it is not
    /// part of the returned list since it no longer exists afterwards.
    async fn swap_alias(
        &self,
        alias: &str,
        new_index: &str,
    ) -> Result<Vec<String>, SearchIndexError> {
        let replaced: Vec<String> = self
            .alias_targets(alias)
            .await?
            .into_iter()
            .filter(|index| index != new_index)
            .collect();

        let mut actions: Vec<Value> = replaced
            .iter()
            .map(|old_index| json!({ "remove": { "index": old_index, "alias": alias } }))
            .collect();

        if replaced.is_empty() && self.index_exists(alias).await? {
            warn!(alias = %alias, "Concrete index occupies the alias name, removing it");
            actions.push(json!({ "remove_index": { "index": alias } }));
        }

        actions.push(json!({ "add": { "index": new_index, "alias": alias } }));

        let response = self
            .client
            .indices()
            .update_aliases()
            .body(json!({ "actions": actions }))
            .send()
            .await
            .map_err(|e| SearchIndexError::alias(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(alias = %alias, status = %status, body = %error_body, "Alias update request failed");
            return Err(SearchIndexError::alias(format!(
                "Swap of alias {} to {} failed with status {}: {}",
                alias, new_index, status, error_body
            )));
        }

        info!(alias = %alias, new_index = %new_index, replaced = ?replaced, "Alias swapped");
        Ok(replaced)
    }

    async fn search(&self, body: &Value) -> Result<Value, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.index_config.alias.as_str()]))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchIndexError::search(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))
    }
}
