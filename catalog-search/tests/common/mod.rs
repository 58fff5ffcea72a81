//! Shared in-memory doubles for the catalog search integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use catalog_search::notifier::FailureNotifier;
use catalog_search::errors::NotifyError;
use catalog_search_repository::{
    BatchOperationResult, BatchOperationSummary, SearchIndexError, SearchIndexProvider,
    SearchIndexService, SearchIndexServiceConfig,
};
use catalog_search_shared::{
    Category, CategoryRef, MediaFile, PopulatedProduct, SearchDocument, Seller, SellerMetadata,
    Tag,
};
use catalog_store_repository::{PopulateProfile, PrimaryStore, StoreError};
use serde_json::{json, Value};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct StoreState {
    pub products: BTreeMap<i64, PopulatedProduct>,
    pub categories: Vec<Category>,
    pub fail_products: bool,
    pub fail_categories: bool,
    pub slug_lookups: usize,
    pub child_lookups: usize,
}

/// Primary store backed by in-memory maps.
#[derive(Clone, Default)]
pub struct MockStore {
    pub state: Arc<Mutex<StoreState>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_products(products: Vec<PopulatedProduct>) -> Self {
        let store = Self::new();
        store.insert_products(products).await;
        store
    }

    pub async fn insert_products(&self, products: Vec<PopulatedProduct>) {
        let mut state = self.state.lock().await;
        for product in products {
            state.products.insert(product.id, product);
        }
    }

    pub async fn set_categories(&self, categories: Vec<Category>) {
        self.state.lock().await.categories = categories;
    }

    pub async fn fail_products(&self) {
        self.state.lock().await.fail_products = true;
    }

    pub async fn fail_categories(&self) {
        self.state.lock().await.fail_categories = true;
    }

    pub async fn category_lookups(&self) -> (usize, usize) {
        let state = self.state.lock().await;
        (state.slug_lookups, state.child_lookups)
    }
}

#[async_trait]
impl PrimaryStore for MockStore {
    async fn find_product_by_id(
        &self,
        id: i64,
        _profile: PopulateProfile,
    ) -> Result<Option<PopulatedProduct>, StoreError> {
        let state = self.state.lock().await;
        if state.fail_products {
            return Err(StoreError::data("connection pool timed out"));
        }
        Ok(state.products.get(&id).cloned())
    }

    async fn find_all_products(
        &self,
        _profile: PopulateProfile,
    ) -> Result<Vec<PopulatedProduct>, StoreError> {
        let state = self.state.lock().await;
        if state.fail_products {
            return Err(StoreError::data("connection pool timed out"));
        }
        Ok(state.products.values().cloned().collect())
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let mut state = self.state.lock().await;
        state.slug_lookups += 1;
        if state.fail_categories {
            return Err(StoreError::data("categories table unavailable"));
        }
        Ok(state.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn find_child_categories(&self, parent_id: i64) -> Result<Vec<Category>, StoreError> {
        let mut state = self.state.lock().await;
        state.child_lookups += 1;
        if state.fail_categories {
            return Err(StoreError::data("categories table unavailable"));
        }
        Ok(state
            .categories
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct IndexState {
    pub indices: HashMap<String, BTreeMap<i64, SearchDocument>>,
    pub searches: Vec<Value>,
    pub calls: Vec<String>,
    pub fail_writes: bool,
    pub fail_searches: bool,
}

/// Search index provider holding documents in memory.
#[derive(Clone)]
pub struct MockIndex {
    pub state: Arc<Mutex<IndexState>>,
    search_response: Value,
}

pub const ALIAS: &str = "products";

impl Default for MockIndex {
    fn default() -> Self {
        Self {
            state: Arc::default(),
            search_response: json!({
                "hits": { "total": { "value": 0 }, "hits": [] },
                "aggregations": {}
            }),
        }
    }
}

impl MockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_response(response: Value) -> Self {
        Self {
            search_response: response,
            ..Self::default()
        }
    }

    /// Wrap a clone of this provider in a service with no retry backoff.
    pub fn service(&self) -> Arc<SearchIndexService> {
        Arc::new(SearchIndexService::with_config(
            Box::new(self.clone()),
            SearchIndexServiceConfig {
                retry_backoff: Duration::ZERO,
                max_batch_retries: 0,
                ..Default::default()
            },
        ))
    }

    pub async fn fail_writes(&self, fail: bool) {
        self.state.lock().await.fail_writes = fail;
    }

    pub async fn fail_searches(&self) {
        self.state.lock().await.fail_searches = true;
    }

    pub async fn document(&self, id: i64) -> Option<SearchDocument> {
        self.state
            .lock()
            .await
            .indices
            .get(ALIAS)
            .and_then(|docs| docs.get(&id).cloned())
    }

    pub async fn ids(&self) -> Vec<i64> {
        self.state
            .lock()
            .await
            .indices
            .get(ALIAS)
            .map(|docs| docs.keys().copied().collect())
            .unwrap_or_default()
    }

    pub async fn searches(&self) -> Vec<Value> {
        self.state.lock().await.searches.clone()
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }
}

#[async_trait]
impl SearchIndexProvider for MockIndex {
    fn alias(&self) -> &str {
        ALIAS
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        Ok(self.state.lock().await.indices.contains_key(index))
    }

    async fn create_index_if_missing(
        &self,
        index: &str,
        _definition: &Value,
    ) -> Result<bool, SearchIndexError> {
        let mut state = self.state.lock().await;
        if state.indices.contains_key(index) {
            return Ok(false);
        }
        state.indices.insert(index.to_string(), BTreeMap::new());
        Ok(true)
    }

    async fn ensure_index_exists(
        &self,
        index: &str,
        _definition: &Value,
    ) -> Result<(), SearchIndexError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("recreate:{}", index));
        state.indices.insert(index.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError> {
        self.state.lock().await.indices.remove(index);
        Ok(())
    }

    async fn upsert_document(&self, document: &SearchDocument) -> Result<(), SearchIndexError> {
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(SearchIndexError::connection("connection refused"));
        }
        state.calls.push(format!("upsert:{}", document.id));
        state
            .indices
            .entry(ALIAS.to_string())
            .or_default()
            .insert(document.id, document.clone());
        Ok(())
    }

    async fn delete_document(&self, product_id: i64) -> Result<(), SearchIndexError> {
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(SearchIndexError::delete("status 500"));
        }
        state.calls.push(format!("delete:{}", product_id));
        if let Some(docs) = state.indices.get_mut(ALIAS) {
            docs.remove(&product_id);
        }
        Ok(())
    }

    async fn bulk_upsert_documents(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(SearchIndexError::bulk_index("connection reset"));
        }
        let docs = state.indices.entry(index.to_string()).or_default();
        let results = documents
            .iter()
            .map(|doc| {
                docs.insert(doc.id, doc.clone());
                BatchOperationResult::succeeded(doc.id)
            })
            .collect();
        Ok(BatchOperationSummary::from_results(results))
    }

    async fn refresh_index(&self, index: &str) -> Result<(), SearchIndexError> {
        self.state.lock().await.calls.push(format!("refresh:{}", index));
        Ok(())
    }

    async fn update_index_settings(
        &self,
        index: &str,
        _settings: &Value,
    ) -> Result<(), SearchIndexError> {
        self.state.lock().await.calls.push(format!("settings:{}", index));
        Ok(())
    }

    async fn swap_alias(
        &self,
        alias: &str,
        new_index: &str,
    ) -> Result<Vec<String>, SearchIndexError> {
        self.state
            .lock()
            .await
            .calls
            .push(format!("swap:{}->{}", alias, new_index));
        Ok(Vec::new())
    }

    async fn search(&self, body: &Value) -> Result<Value, SearchIndexError> {
        let mut state = self.state.lock().await;
        if state.fail_searches {
            return Err(SearchIndexError::connection("connection refused"));
        }
        state.searches.push(body.clone());
        Ok(self.search_response.clone())
    }
}

/// A failure report as received by the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub product_id: i64,
    pub title: String,
    pub error: String,
}

/// Notifier that records every report, optionally failing after recording it.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub received: Arc<Mutex<Vec<Notification>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl FailureNotifier for RecordingNotifier {
    async fn notify_sync_failure(
        &self,
        product_id: i64,
        product_title: &str,
        error_message: &str,
    ) -> Result<(), NotifyError> {
        self.received.lock().await.push(Notification {
            product_id,
            title: product_title.to_string(),
            error: error_message.to_string(),
        });
        if self.fail {
            return Err(NotifyError::transport("webhook unreachable"));
        }
        Ok(())
    }
}

pub fn category(id: i64, slug: &str, parent_id: Option<i64>) -> Category {
    Category {
        id,
        name: slug.to_string(),
        slug: slug.to_string(),
        description: None,
        parent_id,
    }
}

/// weapons(1) -> rifles(2) -> bolt-action(3) -> scopes(4), plus optics(5).
pub fn category_tree() -> Vec<Category> {
    vec![
        category(1, "weapons", None),
        category(2, "rifles", Some(1)),
        category(3, "bolt-action", Some(2)),
        category(4, "scopes", Some(3)),
        category(5, "optics", None),
    ]
}

/// The "AK furniture set" listing: priced in three currencies, filed under
/// Stocks inside Rifles, sold by a seller with business metadata.
pub fn ak_furniture_set() -> PopulatedProduct {
    PopulatedProduct {
        price_usd: Some(100.0),
        price_eur: Some(90.0),
        price_uah: Some(4000.0),
        status: Some("available".to_string()),
        condition: Some("used".to_string()),
        views: Some(12),
        category: Some(
            CategoryRef::new(6, "Stocks", "stocks").with_parent(CategoryRef::new(2, "Rifles", "rifles")),
        ),
        tags: vec![Tag::new(10, "Used", "used"), Tag::new(11, "Rare", "rare")],
        seller: Some(Seller {
            id: 7,
            username: Some("gunsmith".to_string()),
            email: Some("gunsmith@example.com".to_string()),
            metadata: Some(SellerMetadata {
                company_name: Some("Armory Ltd".to_string()),
                business_type: Some("shop".to_string()),
                country: Some("UA".to_string()),
                avatar: Some(MediaFile {
                    id: 102,
                    url: "/uploads/avatar.png".to_string(),
                    ..Default::default()
                }),
            }),
        }),
        images: vec![MediaFile {
            id: 100,
            url: "/uploads/ak-1.jpg".to_string(),
            ..Default::default()
        }],
        ..PopulatedProduct::new(42, "AK furniture set")
    }
}

/// A raw engine response with one hit per document.
pub fn hits_response(documents: &[SearchDocument]) -> Value {
    let hits: Vec<Value> = documents
        .iter()
        .map(|doc| json!({ "_id": doc.document_id(), "_source": doc }))
        .collect();
    json!({
        "hits": { "total": { "value": documents.len() }, "hits": hits },
        "aggregations": {
            "categories": { "buckets": [{ "key": "stocks", "doc_count": documents.len() }] }
        }
    })
}
