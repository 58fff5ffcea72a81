//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the product search index.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

/// Configuration for the search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The index or alias name used for per-document writes and searches.
    pub alias: String,
    /// Attach `updatedAt` as an external version to every write.
    pub version_fencing: bool,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `alias` - The index alias name
    /// * `version_fencing` - Whether to reject writes older than the indexed document
    pub fn new(alias: impl Into<String>, version_fencing: bool) -> Self {
        Self {
            alias: alias.into(),
            version_fencing,
        }
    }
}

/// Refresh interval applied once an index is live.
pub const LIVE_REFRESH_INTERVAL: &str = "1s";

/// Get the concrete index name for an alias-swap rebuild started at `started_at`.
///
/// # Returns
///
/// The versioned index name (e.g., "products_20240501120000")
pub fn get_versioned_index_name(alias: &str, started_at: DateTime<Utc>) -> String {
    format!("{}_{}", alias, started_at.format("%Y%m%d%H%M%S"))
}

/// Text field that is searched tokenized and sorted on its `keyword` sub-field.
fn sortable_text() -> Value {
    json!({
        "type": "text",
        "fields": {
            "keyword": {
                "type": "keyword",
                "normalizer": "lowercase_normalizer",
                "ignore_above": 256
            }
        }
    })
}

fn category_summary_properties() -> Value {
    json!({
        "id": { "type": "long" },
        "name": { "type": "keyword" },
        "slug": { "type": "keyword" }
    })
}

fn category_properties() -> Value {
    json!({
        "id": { "type": "long" },
        "name": { "type": "text" },
        "slug": { "type": "keyword" },
        "description": { "type": "text" },
        "parent": { "properties": category_summary_properties() }
    })
}

fn hierarchy_properties() -> Value {
    json!({
        "id": { "type": "long" },
        "name": { "type": "keyword" },
        "slug": { "type": "keyword" },
        "level": { "type": "integer" }
    })
}

fn tag_properties() -> Value {
    let name = json!({
        "type": "text",
        "fields": { "keyword": { "type": "keyword" } }
    });
    json!({
        "id": { "type": "long" },
        "name": name,
        "slug": { "type": "keyword" }
    })
}

fn seller_properties() -> Value {
    json!({
        "id": { "type": "long" },
        "username": { "type": "keyword" },
        "email": { "type": "keyword" },
        "companyName": { "type": "text" },
        "businessType": { "type": "keyword" },
        "country": { "type": "keyword" },
        "avatarUrl": { "type": "keyword", "index": false }
    })
}

fn image_properties() -> Value {
    json!({
        "id": { "type": "long" },
        "url": { "type": "keyword", "index": false },
        "alternativeText": { "type": "text" },
        "width": { "type": "integer" },
        "height": { "type": "integer" }
    })
}

/// Get the field mappings for the product search index.
///
/// Every text field that is ever sorted on carries a normalized `keyword`
/// sub-field. Arrays that are filtered per element (`tags`, `images`,
/// `categoryHierarchy`, `subcategories`) are `nested` so that conditions on
/// one element never match across two different elements.
pub fn get_index_mappings() -> Value {
    let keyword = || json!({ "type": "keyword" });
    let long = || json!({ "type": "long" });
    let double = || json!({ "type": "double" });
    let date = || json!({ "type": "date" });

    let fields: Vec<(&str, Value)> = vec![
        ("id", long()),
        ("title", sortable_text()),
        ("slug", keyword()),
        ("sku", keyword()),
        ("description", sortable_text()),
        ("price", double()),
        ("priceUSD", double()),
        ("priceEUR", double()),
        ("priceUAH", double()),
        ("currency", keyword()),
        ("status", keyword()),
        ("views", long()),
        ("createdAt", date()),
        ("updatedAt", date()),
        ("publishedAt", date()),
        ("attributes", json!({ "type": "object", "enabled": false })),
        ("available", json!({ "type": "boolean" })),
        ("condition", keyword()),
        ("videoUrl", json!({ "type": "keyword", "index": false })),
        ("category", json!({ "properties": category_properties() })),
        ("categoryId", long()),
        ("categoryName", sortable_text()),
        ("categorySlug", keyword()),
        ("parentCategoryId", long()),
        ("parentCategoryName", sortable_text()),
        ("parentCategorySlug", keyword()),
        (
            "categoryHierarchy",
            json!({ "type": "nested", "properties": hierarchy_properties() }),
        ),
        ("tags", json!({ "type": "nested", "properties": tag_properties() })),
        ("seller", json!({ "properties": seller_properties() })),
        ("sellerId", long()),
        ("sellerCompanyName", sortable_text()),
        ("images", json!({ "type": "nested", "properties": image_properties() })),
        (
            "subcategories",
            json!({ "type": "nested", "properties": category_summary_properties() }),
        ),
    ];

    let properties: Map<String, Value> = fields
        .into_iter()
        .map(|(name, mapping)| (name.to_string(), mapping))
        .collect();

    json!({ "properties": properties })
}

/// Get the index settings and mappings used when creating an index.
///
/// # Arguments
///
/// * `replicas` - Number of replicas
/// * `refresh_interval` - Refresh interval (`"-1"` disables periodic refresh)
pub fn get_index_definition(replicas: u32, refresh_interval: &str) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": replicas,
            "refresh_interval": refresh_interval,
            "analysis": {
                "normalizer": {
                    "lowercase_normalizer": {
                        "type": "custom",
                        "filter": ["lowercase", "asciifolding"]
                    }
                }
            }
        },
        "mappings": get_index_mappings()
    })
}

/// Index definition for the live index served to the lifecycle path.
pub fn get_live_index_definition(replicas: u32) -> Value {
    get_index_definition(replicas, LIVE_REFRESH_INTERVAL)
}

/// Index definition for an index that is about to receive a full backfill.
///
/// Replicas and periodic refresh are off until `finalized_settings` is applied.
pub fn get_bulk_load_index_definition() -> Value {
    get_index_definition(0, "-1")
}

/// Dynamic settings applied after the last bulk batch.
pub fn finalized_settings(replicas: u32) -> Value {
    json!({
        "index": {
            "number_of_replicas": replicas,
            "refresh_interval": LIVE_REFRESH_INTERVAL
        }
    })
}
