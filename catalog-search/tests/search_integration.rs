//! Integration tests for the query facade: category closure resolution,
//! empty-scope short-circuits and engine error mapping.

mod common;

use std::sync::Arc;

use catalog_search::processor::map_product_to_document;
use catalog_search::resolver::CategoryClosureResolver;
use catalog_search::search::CatalogSearch;
use catalog_search::QueryError;
use catalog_search_shared::{AggregationIntent, Currency, PriceRange, SearchFilters, SearchIntent};
use common::{ak_furniture_set, category_tree, hits_response, MockIndex, MockStore};
use serde_json::Value;

async fn catalog_search(store: &MockStore, index: &MockIndex) -> CatalogSearch {
    store.set_categories(category_tree()).await;
    CatalogSearch::new(
        index.service(),
        CategoryClosureResolver::new(Arc::new(store.clone())),
    )
}

fn in_category(slug: &str) -> SearchFilters {
    SearchFilters {
        category_slug: Some(slug.to_string()),
        ..Default::default()
    }
}

fn body_text(body: &Value) -> String {
    serde_json::to_string(body).unwrap()
}

#[tokio::test]
async fn test_unknown_category_returns_empty_page_without_querying() {
    let store = MockStore::new();
    let index = MockIndex::new();
    let search = catalog_search(&store, &index).await;

    let page = search
        .search(&SearchIntent::with_filters(in_category("nonexistent")))
        .await
        .unwrap();

    assert!(page.hits.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.page_count, 0);
    assert!(index.searches().await.is_empty());
}

#[tokio::test]
async fn test_unknown_category_aggregations_are_empty_without_querying() {
    let store = MockStore::new();
    let index = MockIndex::new();
    let search = catalog_search(&store, &index).await;

    let aggregations = search
        .aggregate(&AggregationIntent::new(in_category("nonexistent")))
        .await
        .unwrap();

    assert!(aggregations.categories.is_empty());
    assert!(index.searches().await.is_empty());
}

#[tokio::test]
async fn test_category_scope_covers_all_descendants() {
    let store = MockStore::new();
    let index = MockIndex::new();
    let search = catalog_search(&store, &index).await;

    search
        .search(&SearchIntent::with_filters(in_category("weapons")))
        .await
        .unwrap();

    let searches = index.searches().await;
    assert_eq!(searches.len(), 1);
    let body = body_text(&searches[0]);
    assert!(body.contains(r#""categoryId":[1,2,3,4]"#), "{}", body);
    assert!(body.contains(r#""parentCategoryId":[1,2,3,4]"#), "{}", body);
}

#[tokio::test]
async fn test_leaf_category_scope_is_itself() {
    let store = MockStore::new();
    let index = MockIndex::new();
    let search = catalog_search(&store, &index).await;

    search
        .search(&SearchIntent::with_filters(in_category("scopes")))
        .await
        .unwrap();

    let body = body_text(&index.searches().await[0]);
    assert!(body.contains(r#""categoryId":[4]"#), "{}", body);
}

#[tokio::test]
async fn test_explicit_category_list_skips_resolution() {
    let store = MockStore::new();
    let index = MockIndex::new();
    let search = catalog_search(&store, &index).await;

    let filters = SearchFilters {
        category_slug: Some("weapons".to_string()),
        category_slugs: vec!["rifles".to_string(), "optics".to_string()],
        ..Default::default()
    };
    search.search(&SearchIntent::with_filters(filters)).await.unwrap();

    assert_eq!(store.category_lookups().await, (0, 0));
    let body = body_text(&index.searches().await[0]);
    assert!(body.contains(r#""categorySlug":["rifles","optics"]"#), "{}", body);
    assert!(!body.contains("categoryId"), "{}", body);
}

#[tokio::test]
async fn test_unscoped_search_does_not_touch_categories() {
    let store = MockStore::new();
    let index = MockIndex::new();
    let search = catalog_search(&store, &index).await;

    search.search(&SearchIntent::default()).await.unwrap();

    assert_eq!(store.category_lookups().await, (0, 0));
    assert_eq!(index.searches().await.len(), 1);
}

#[tokio::test]
async fn test_currency_selects_price_field() {
    let store = MockStore::new();
    let index = MockIndex::new();
    let search = catalog_search(&store, &index).await;

    let filters = SearchFilters {
        price: Some(PriceRange::new(Some(80.0), Some(95.0))),
        currency: Some(Currency::EUR),
        ..Default::default()
    };
    search.search(&SearchIntent::with_filters(filters)).await.unwrap();

    let body = body_text(&index.searches().await[0]);
    assert!(body.contains("priceEUR"), "{}", body);
    assert!(!body.contains("priceUSD"), "{}", body);
}

#[tokio::test]
async fn test_search_returns_stored_documents() {
    let document = map_product_to_document(&ak_furniture_set());
    let store = MockStore::new();
    let index = MockIndex::with_search_response(hits_response(&[document.clone()]));
    let search = catalog_search(&store, &index).await;

    let page = search
        .search(&SearchIntent::with_filters(in_category("rifles")))
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.hits, vec![document]);
}

#[tokio::test]
async fn test_search_with_aggregations_resolves_once() {
    let document = map_product_to_document(&ak_furniture_set());
    let store = MockStore::new();
    let index = MockIndex::with_search_response(hits_response(&[document]));
    let search = catalog_search(&store, &index).await;

    let result = search
        .search_with_aggregations(&SearchIntent::with_filters(in_category("rifles")))
        .await
        .unwrap();

    assert_eq!(result.page.total, 1);
    assert_eq!(result.aggregations.categories[0].key, "stocks");
    assert_eq!(store.category_lookups().await.0, 1);
    assert_eq!(index.searches().await.len(), 2);
}

#[tokio::test]
async fn test_category_store_failure_is_a_resolution_error() {
    let store = MockStore::new();
    let index = MockIndex::new();
    let search = catalog_search(&store, &index).await;
    store.fail_categories().await;

    let result = search
        .search(&SearchIntent::with_filters(in_category("weapons")))
        .await;

    assert!(matches!(result, Err(QueryError::CategoryResolution(_))));
    assert!(index.searches().await.is_empty());
}

#[tokio::test]
async fn test_engine_outage_is_reported_as_unavailable() {
    let store = MockStore::new();
    let index = MockIndex::new();
    index.fail_searches().await;
    let search = catalog_search(&store, &index).await;

    let err = search.search(&SearchIntent::default()).await.unwrap_err();

    assert!(matches!(err, QueryError::Engine(_)));
    assert!(err.is_unavailable());
}
