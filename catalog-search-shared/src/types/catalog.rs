//! Primary-store record types.
//!
//! These are the shapes the indexer reads from the authoritative catalog
//! store. They are read-only from the indexer's perspective: nothing in the
//! search pipeline writes them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A category row as stored, with its parent referenced by id.
///
/// Used by the category closure resolver, which walks parent/child links
/// one level at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// A category populated together with its ancestor chain.
///
/// The chain is usually one level deep (category → parent), but nothing
/// stops deeper nesting, so the parent is itself a `CategoryRef`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<Box<CategoryRef>>,
}

impl CategoryRef {
    /// Create a root category (no parent).
    pub fn new(id: i64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            description: None,
            parent: None,
        }
    }

    /// Attach a parent category.
    pub fn with_parent(mut self, parent: CategoryRef) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

/// A product tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn new(id: i64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// An uploaded media file (product image or seller avatar).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alternative_text: Option<String>,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    #[serde(default)]
    pub mime: Option<String>,
}

/// Business metadata attached to a seller account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SellerMetadata {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub avatar: Option<MediaFile>,
}

/// The user account that sells a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Seller {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub metadata: Option<SellerMetadata>,
}

/// A product loaded with every relation the search document needs.
///
/// Scalar fields the store may leave empty are optional here; the document
/// mapper substitutes defaults for them. Relations that were not populated
/// (or are genuinely absent) are `None` or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedProduct {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Legacy single-currency price.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, rename = "priceUSD")]
    pub price_usd: Option<f64>,
    #[serde(default, rename = "priceEUR")]
    pub price_eur: Option<f64>,
    #[serde(default, rename = "priceUAH")]
    pub price_uah: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub views: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Free-form attribute map.
    #[serde(default)]
    pub attributes: Option<Value>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub seller: Option<Seller>,
    #[serde(default)]
    pub images: Vec<MediaFile>,
    #[serde(default)]
    pub subcategories: Vec<CategoryRef>,
}

impl PopulatedProduct {
    /// Create a product with only an id and title; everything else empty.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Title used in logs and failure notifications.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}
