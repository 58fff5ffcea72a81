//! Aggregation body construction.

use catalog_search_shared::{AggregationIntent, Currency};
use serde_json::{json, Map, Value};

use crate::query::filters::{build_bool_query, CategoryScope};

/// Maximum number of category buckets returned.
pub const CATEGORY_FACET_SIZE: usize = 100;

/// Maximum number of buckets for tag and subcategory facets.
pub const RELATION_FACET_SIZE: usize = 100;

/// Maximum number of buckets for small keyword facets (status, condition).
pub const KEYWORD_FACET_SIZE: usize = 20;

/// Name of the stats aggregation for one currency.
pub fn price_stats_name(currency: Currency) -> String {
    format!("price_{}", currency.code())
}

/// Build the aggregation body paired with a search.
///
/// Uses the same filters as the search except the price range, and computes
/// price statistics for every currency in one request.
pub fn build_aggregation_query(intent: &AggregationIntent, scope: &CategoryScope) -> Value {
    let mut aggs = Map::new();

    aggs.insert(
        "categories".to_string(),
        json!({ "terms": { "field": "categorySlug", "size": CATEGORY_FACET_SIZE } }),
    );
    aggs.insert("tags".to_string(), nested_facet("tags", "tags.slug"));
    aggs.insert(
        "subcategories".to_string(),
        nested_facet("subcategories", "subcategories.slug"),
    );
    aggs.insert(
        "availability".to_string(),
        json!({ "terms": { "field": "status", "size": KEYWORD_FACET_SIZE } }),
    );
    aggs.insert(
        "condition".to_string(),
        json!({ "terms": { "field": "condition", "size": KEYWORD_FACET_SIZE } }),
    );

    for currency in Currency::ALL {
        aggs.insert(
            price_stats_name(currency),
            json!({ "stats": { "field": currency.price_field() } }),
        );
    }

    json!({
        "size": 0,
        "track_total_hits": true,
        "query": build_bool_query(&intent.filters, scope, false),
        "aggs": aggs
    })
}

/// Terms facet over a nested array, counted per product rather than per element.
fn nested_facet(path: &str, field: &str) -> Value {
    json!({
        "nested": { "path": path },
        "aggs": {
            "values": {
                "terms": { "field": field, "size": RELATION_FACET_SIZE },
                "aggs": {
                    "products": { "reverse_nested": {} }
                }
            }
        }
    })
}
