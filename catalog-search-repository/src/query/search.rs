//! Search body construction.

use catalog_search_shared::SearchIntent;
use serde_json::{json, Value};

use crate::query::filters::{build_bool_query, CategoryScope};
use crate::query::sort::build_sort;

/// Build the search body for one page of results.
///
/// Pure and deterministic. The category closure must already be resolved
/// into `scope`; an empty closure yields a query that matches nothing.
pub fn build_search_query(intent: &SearchIntent, scope: &CategoryScope) -> Value {
    let filters = &intent.filters;

    json!({
        "from": intent.offset(),
        "size": intent.effective_page_size(),
        "track_total_hits": true,
        "query": build_bool_query(filters, scope, true),
        "sort": build_sort(
            intent.sort.as_ref(),
            filters.currency,
            filters.text_term().is_some(),
        )
    })
}
