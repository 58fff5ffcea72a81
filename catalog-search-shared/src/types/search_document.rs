//! Search document types for the product index.
//!
//! This module defines the denormalized document structure that is written to
//! the search engine. A document is always a full snapshot of one product and
//! its resolved relations; it is never patched field by field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document representation of a product in the search index.
///
/// Besides the nested `category`, `seller` and relation arrays, the document
/// carries redundant scalar fields (`categoryId`, `parentCategorySlug`,
/// `sellerCompanyName`, ...) so that filters and sorts can use plain term
/// queries instead of nested ones.
///
/// Optional fields serialize as `null` rather than being omitted, so an
/// upsert always overwrites every field of a previous version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    pub id: i64,
    pub title: String,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    /// Legacy single-currency price.
    pub price: f64,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
    #[serde(rename = "priceEUR")]
    pub price_eur: f64,
    #[serde(rename = "priceUAH")]
    pub price_uah: f64,
    pub currency: String,
    pub status: String,
    pub views: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub attributes: Option<Value>,
    pub available: bool,
    pub condition: String,
    pub video_url: Option<String>,

    pub category: Option<DocumentCategory>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub parent_category_id: Option<i64>,
    pub parent_category_name: Option<String>,
    pub parent_category_slug: Option<String>,
    /// Direct category first, then its ancestors, nearest first.
    #[serde(default)]
    pub category_hierarchy: Vec<HierarchyEntry>,

    #[serde(default)]
    pub tags: Vec<DocumentTag>,

    pub seller: Option<DocumentSeller>,
    pub seller_id: Option<i64>,
    pub seller_company_name: Option<String>,

    #[serde(default)]
    pub images: Vec<DocumentImage>,
    #[serde(default)]
    pub subcategories: Vec<CategorySummary>,
}

impl SearchDocument {
    /// The document id used in the search index: the stringified product id.
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }

    /// External version derived from `updatedAt`, in epoch milliseconds.
    ///
    /// Used to fence out stale upserts when version fencing is enabled.
    pub fn version(&self) -> Option<i64> {
        self.updated_at.map(|ts| ts.timestamp_millis())
    }
}

/// The product's direct category with its parent resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent: Option<CategorySummary>,
}

/// Id, name and slug of a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// One level of the materialized category hierarchy.
///
/// `level` is 0 for the product's own category, 1 for its parent, and so on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HierarchyEntry {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentTag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Seller with the metadata sub-object flattened into top-level fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSeller {
    pub id: i64,
    pub username: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub business_type: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentImage {
    pub id: i64,
    pub url: String,
    pub alternative_text: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}
