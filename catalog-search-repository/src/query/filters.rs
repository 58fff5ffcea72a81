//! Filter clauses shared by search and aggregation bodies.

use catalog_search_shared::{price_field_for, PriceRange, SearchFilters};
use serde_json::{json, Value};

/// Fields matched by the free-text query, with boosts.
///
/// Title outranks every other field so exact title hits sort first.
pub const TEXT_FIELDS: [&str; 5] = [
    "title^3",
    "description",
    "categoryName^2",
    "parentCategoryName",
    "sellerCompanyName",
];

/// Category restriction resolved before translation.
///
/// The translator never calls the closure resolver itself; the caller decides
/// whether a category filter applies and, if so, which ids it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryScope {
    /// No single-category restriction.
    Unscoped,
    /// A category and all of its descendants.
    Closure(Vec<i64>),
}

impl CategoryScope {
    /// True when a category was requested but resolved to nothing.
    ///
    /// Callers must short-circuit to an empty result instead of querying.
    pub fn is_empty_closure(&self) -> bool {
        matches!(self, CategoryScope::Closure(ids) if ids.is_empty())
    }
}

/// Build the `bool` query shared by search and aggregation bodies.
///
/// `include_price` is false for aggregations so price facets reflect the
/// whole filtered set rather than the currently selected range.
pub(crate) fn build_bool_query(
    filters: &SearchFilters,
    scope: &CategoryScope,
    include_price: bool,
) -> Value {
    let must = match filters.text_term() {
        Some(term) => vec![text_query(term)],
        None => vec![json!({ "match_all": {} })],
    };

    json!({
        "bool": {
            "must": must,
            "filter": filter_clauses(filters, scope, include_price)
        }
    })
}

/// Fuzzy multi-field match plus a fuzzy match on nested tag names.
pub(crate) fn text_query(term: &str) -> Value {
    json!({
        "bool": {
            "should": [
                {
                    "multi_match": {
                        "query": term,
                        "fields": TEXT_FIELDS,
                        "fuzziness": "AUTO",
                        "fuzzy_transpositions": true
                    }
                },
                {
                    "nested": {
                        "path": "tags",
                        "score_mode": "max",
                        "query": {
                            "match": {
                                "tags.name": {
                                    "query": term,
                                    "fuzziness": "AUTO"
                                }
                            }
                        }
                    }
                }
            ],
            "minimum_should_match": 1
        }
    })
}

pub(crate) fn filter_clauses(
    filters: &SearchFilters,
    scope: &CategoryScope,
    include_price: bool,
) -> Vec<Value> {
    let mut clauses = Vec::new();

    // An explicit slug list replaces the single-category closure.
    if !filters.category_slugs.is_empty() {
        clauses.push(either_field(
            "categorySlug",
            "parentCategorySlug",
            json!(filters.category_slugs),
        ));
    } else if let CategoryScope::Closure(ids) = scope {
        if ids.is_empty() {
            clauses.push(json!({ "match_none": {} }));
        } else {
            clauses.push(either_field("categoryId", "parentCategoryId", json!(ids)));
        }
    }

    if include_price {
        if let Some(range) = filters.price.as_ref().filter(|r| !r.is_unbounded()) {
            clauses.push(price_range(range, price_field_for(filters.currency)));
        }
    }

    if !filters.tags.is_empty() {
        clauses.push(nested_terms("tags", "tags.slug", &filters.tags));
    }
    if !filters.subcategories.is_empty() {
        clauses.push(nested_terms(
            "subcategories",
            "subcategories.slug",
            &filters.subcategories,
        ));
    }
    if !filters.statuses.is_empty() {
        clauses.push(json!({ "terms": { "status": filters.statuses } }));
    }
    if let Some(available) = filters.available {
        clauses.push(json!({ "term": { "available": available } }));
    }
    if !filters.conditions.is_empty() {
        clauses.push(json!({ "terms": { "condition": filters.conditions } }));
    }
    if let Some(seller_id) = filters.seller_id {
        clauses.push(json!({ "term": { "sellerId": seller_id } }));
    }

    clauses
}

/// Match documents whose own field or parent field is among `values`.
fn either_field(own: &str, parent: &str, values: Value) -> Value {
    json!({
        "bool": {
            "should": [
                { "terms": { own: values.clone() } },
                { "terms": { parent: values } }
            ],
            "minimum_should_match": 1
        }
    })
}

fn price_range(range: &PriceRange, field: &str) -> Value {
    let mut bounds = serde_json::Map::new();
    if let Some(min) = range.min {
        bounds.insert("gte".to_string(), json!(min));
    }
    if let Some(max) = range.max {
        bounds.insert("lte".to_string(), json!(max));
    }
    json!({ "range": { field: bounds } })
}

fn nested_terms(path: &str, field: &str, values: &[String]) -> Value {
    json!({
        "nested": {
            "path": path,
            "query": { "terms": { field: values } }
        }
    })
}
