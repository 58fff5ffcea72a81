//! Query-string parsing for the search endpoints.
//!
//! Lists are comma separated (`tags=used,rare`). Unknown keys are ignored.

use std::collections::HashMap;
use std::str::FromStr;

use catalog_search_shared::{
    Currency, PriceRange, SearchFilters, SearchIntent, SortDirection, SortField, SortSpec,
    DEFAULT_PAGE_SIZE, MAX_RESULT_WINDOW,
};

use crate::errors::QueryError;

pub type Params = HashMap<String, String>;

fn value<'a>(params: &'a Params, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| params.get(*key))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

fn list(params: &Params, key: &str) -> Vec<String> {
    params
        .get(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parsed<T>(params: &Params, keys: &[&str]) -> Result<Option<T>, QueryError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value(params, keys)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| QueryError::invalid_query(format!("{}: {}", keys[0], e)))
        })
        .transpose()
}

/// A price bound; `NaN` and infinities are rejected.
fn price_bound(params: &Params, keys: &[&str]) -> Result<Option<f64>, QueryError> {
    match parsed::<f64>(params, keys)? {
        Some(bound) if !bound.is_finite() => Err(QueryError::invalid_query(format!(
            "{}: must be a finite number",
            keys[0]
        ))),
        bound => Ok(bound),
    }
}

/// Filters shared by search and aggregation requests.
pub fn parse_filters(params: &Params) -> Result<SearchFilters, QueryError> {
    let min_price = price_bound(params, &["minPrice", "priceMin"])?;
    let max_price = price_bound(params, &["maxPrice", "priceMax"])?;
    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(QueryError::invalid_query("minPrice is greater than maxPrice"));
        }
    }
    let price = (min_price.is_some() || max_price.is_some())
        .then(|| PriceRange::new(min_price, max_price));

    Ok(SearchFilters {
        text: value(params, &["q", "text"]).map(str::to_string),
        category_slug: value(params, &["category"]).map(str::to_string),
        category_slugs: list(params, "categories"),
        price,
        currency: parsed::<Currency>(params, &["currency"])?,
        tags: list(params, "tags"),
        statuses: list(params, "status"),
        available: parsed::<bool>(params, &["available"])?,
        conditions: list(params, "condition"),
        subcategories: list(params, "subcategories"),
        seller_id: parsed::<i64>(params, &["sellerId"])?,
    })
}

/// Sort from `sort=field`, `sort=field:dir` or `sort=field&order=dir`.
fn parse_sort(params: &Params) -> Result<Option<SortSpec>, QueryError> {
    let Some(raw) = value(params, &["sort"]) else {
        return Ok(None);
    };

    let (field, inline_direction) = match raw.split_once(':') {
        Some((field, direction)) => (field, Some(direction)),
        None => (raw, None),
    };

    let field = field.parse::<SortField>().map_err(QueryError::invalid_query)?;
    let direction = match inline_direction.or_else(|| value(params, &["order", "sortDirection"])) {
        Some(direction) => direction
            .parse::<SortDirection>()
            .map_err(QueryError::invalid_query)?,
        None => SortDirection::default(),
    };

    Ok(Some(SortSpec::new(field, direction)))
}

/// Full search request. Pages past `MAX_RESULT_WINDOW` are rejected.
pub fn parse_search_intent(params: &Params) -> Result<SearchIntent, QueryError> {
    let intent = SearchIntent {
        filters: parse_filters(params)?,
        sort: parse_sort(params)?,
        page: parsed::<usize>(params, &["page"])?.unwrap_or(1),
        page_size: parsed::<usize>(params, &["pageSize", "limit"])?.unwrap_or(DEFAULT_PAGE_SIZE),
    };

    if !intent.within_result_window() {
        return Err(QueryError::invalid_query(format!(
            "page: results beyond the first {} hits are not available",
            MAX_RESULT_WINDOW
        )));
    }
    Ok(intent)
}
