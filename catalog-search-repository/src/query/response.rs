//! Parsing of raw search and aggregation responses.

use catalog_search_shared::{
    AggregationResponse, Currency, FacetBucket, PriceStats, SearchDocument, SearchPage,
};
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::query::aggregation::price_stats_name;

/// Convert a raw search response into a page of documents.
///
/// Hits are deserialized from `_source` unchanged.
pub fn parse_search_response(
    response: &Value,
    page: usize,
    page_size: usize,
) -> Result<SearchPage, SearchIndexError> {
    let hits = &response["hits"];

    // `hits.total` is an object since 7.x and a bare number before.
    let total = hits["total"]["value"]
        .as_u64()
        .or_else(|| hits["total"].as_u64())
        .ok_or_else(|| SearchIndexError::parse("search response has no hits.total"))?;

    let documents = hits["hits"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .map(|hit| {
            serde_json::from_value::<SearchDocument>(hit["_source"].clone()).map_err(|e| {
                SearchIndexError::parse(format!(
                    "hit {}: {}",
                    hit["_id"].as_str().unwrap_or("?"),
                    e
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchPage::new(documents, total, page, page_size))
}

/// Convert a raw aggregation response into facets and price statistics.
pub fn parse_aggregation_response(response: &Value) -> Result<AggregationResponse, SearchIndexError> {
    let aggs = response
        .get("aggregations")
        .ok_or_else(|| SearchIndexError::parse("response has no aggregations"))?;

    let mut result = AggregationResponse::empty();
    result.categories = terms_buckets(&aggs["categories"]);
    result.tags = nested_buckets(&aggs["tags"]);
    result.subcategories = nested_buckets(&aggs["subcategories"]);
    result.availability = terms_buckets(&aggs["availability"]);
    result.condition = terms_buckets(&aggs["condition"]);

    for currency in Currency::ALL {
        result
            .price_stats_by_currency
            .insert(currency, price_stats(&aggs[price_stats_name(currency).as_str()]));
    }

    Ok(result)
}

fn terms_buckets(agg: &Value) -> Vec<FacetBucket> {
    agg["buckets"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .filter_map(|bucket| {
            let key = bucket_key(bucket)?;
            Some(FacetBucket::new(key, bucket["doc_count"].as_u64().unwrap_or(0)))
        })
        .collect()
}

/// Buckets of a nested facet, counted in products via `reverse_nested`.
fn nested_buckets(agg: &Value) -> Vec<FacetBucket> {
    agg["values"]["buckets"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .filter_map(|bucket| {
            let key = bucket_key(bucket)?;
            let count = bucket["products"]["doc_count"]
                .as_u64()
                .or_else(|| bucket["doc_count"].as_u64())
                .unwrap_or(0);
            Some(FacetBucket::new(key, count))
        })
        .collect()
}

fn bucket_key(bucket: &Value) -> Option<String> {
    match &bucket["key"] {
        Value::String(key) => Some(key.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn price_stats(agg: &Value) -> PriceStats {
    let count = agg["count"].as_u64().unwrap_or(0);
    if count == 0 {
        return PriceStats::default();
    }

    PriceStats {
        count,
        min: agg["min"].as_f64(),
        max: agg["max"].as_f64(),
        avg: agg["avg"].as_f64(),
        sum: agg["sum"].as_f64().unwrap_or(0.0),
    }
}
