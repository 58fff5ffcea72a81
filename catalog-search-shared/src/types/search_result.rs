//! Search result types for the product index.
//!
//! This module defines the response structures returned from search and
//! aggregation operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::search_document::SearchDocument;
use crate::types::search_query::Currency;

/// One page of search hits.
///
/// Hits are returned exactly as stored: the search document is already the
/// public shape of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub hits: Vec<SearchDocument>,
    /// Total number of matching documents across all pages.
    pub total: u64,
    pub page: usize,
    pub page_size: usize,
    pub page_count: u64,
}

impl SearchPage {
    /// Create a page, deriving the page count from `total` and `page_size`.
    pub fn new(hits: Vec<SearchDocument>, total: u64, page: usize, page_size: usize) -> Self {
        Self {
            hits,
            total,
            page,
            page_size,
            page_count: page_count(total, page_size),
        }
    }

    /// An explicit empty result: zero hits, zero pages.
    pub fn empty(page: usize, page_size: usize) -> Self {
        Self::new(Vec::new(), 0, page, page_size)
    }
}

fn page_count(total: u64, page_size: usize) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64)
}

/// A facet value and the number of matching documents carrying it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FacetBucket {
    pub key: String,
    pub doc_count: u64,
}

impl FacetBucket {
    pub fn new(key: impl Into<String>, doc_count: u64) -> Self {
        Self {
            key: key.into(),
            doc_count,
        }
    }
}

/// Price statistics for one currency field.
///
/// `min`, `max` and `avg` are `None` when no document matched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceStats {
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub sum: f64,
}

/// Facet counts and per-currency price statistics for a filter set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResponse {
    pub categories: Vec<FacetBucket>,
    pub tags: Vec<FacetBucket>,
    pub price_stats_by_currency: BTreeMap<Currency, PriceStats>,
    pub availability: Vec<FacetBucket>,
    pub condition: Vec<FacetBucket>,
    pub subcategories: Vec<FacetBucket>,
}

impl AggregationResponse {
    /// An explicit empty result with zeroed statistics for every currency.
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
            tags: Vec::new(),
            price_stats_by_currency: Currency::ALL
                .iter()
                .map(|c| (*c, PriceStats::default()))
                .collect(),
            availability: Vec::new(),
            condition: Vec::new(),
            subcategories: Vec::new(),
        }
    }
}
