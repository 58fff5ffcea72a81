//! Tests for the HTTP surface, driven through the router without a listener.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use catalog_search::errors::RateError;
use catalog_search::rates::{CurrencyRateCache, CurrencyRates, RateSource};
use catalog_search::resolver::CategoryClosureResolver;
use catalog_search::search::CatalogSearch;
use catalog_search::server::create_app;
use catalog_search::server::state::AppState;
use catalog_search_shared::{Currency, ProductEvent};
use chrono::Utc;
use common::{category_tree, MockIndex, MockStore};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

struct FixedRates;

#[async_trait]
impl RateSource for FixedRates {
    async fn fetch_rates(&self) -> Result<CurrencyRates, RateError> {
        Ok(CurrencyRates {
            base: Currency::EUR,
            rates: BTreeMap::from([(Currency::USD, 2.0), (Currency::UAH, 40.0)]),
            fetched_at: Utc::now(),
        })
    }
}

struct TestApp {
    app: Router,
    events: mpsc::Receiver<ProductEvent>,
    index: MockIndex,
}

async fn test_app(webhook_token: Option<&str>, with_rates: bool) -> TestApp {
    let store = MockStore::new();
    store.set_categories(category_tree()).await;
    let index = MockIndex::new();
    let (event_sender, events) = mpsc::channel(8);

    let rates = with_rates
        .then(|| Arc::new(CurrencyRateCache::new(Arc::new(FixedRates), Duration::from_secs(60))));

    let state = AppState {
        search: Arc::new(CatalogSearch::new(
            index.service(),
            CategoryClosureResolver::new(Arc::new(store)),
        )),
        rates,
        event_sender,
        webhook_token: webhook_token.map(str::to_string),
    };

    TestApp {
        app: create_app(state),
        events,
        index,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn webhook(payload: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/strapi")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let test = test_app(None, false).await;

    let (status, body) = send(&test.app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_webhook_queues_product_event() {
    let mut test = test_app(Some("s3cret"), false).await;

    let (status, body) = send(
        &test.app,
        webhook(
            json!({ "event": "entry.create", "model": "product", "entry": { "id": 42 } }),
            Some("s3cret"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "queued");
    assert_eq!(
        test.events.try_recv().unwrap(),
        ProductEvent::Created { product_id: 42 }
    );
}

#[tokio::test]
async fn test_webhook_rejects_bad_token() {
    let mut test = test_app(Some("s3cret"), false).await;
    let payload = json!({ "event": "entry.delete", "model": "product", "entry": { "id": 42 } });

    let (status, body) = send(&test.app, webhook(payload.clone(), Some("guess"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");

    let (status, _) = send(&test.app, webhook(payload, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(test.events.try_recv().is_err());
}

#[tokio::test]
async fn test_webhook_ignores_other_models() {
    let mut test = test_app(None, false).await;

    let (status, body) = send(
        &test.app,
        webhook(
            json!({ "event": "entry.update", "model": "category", "entry": { "id": 3 } }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "ignored");
    assert!(test.events.try_recv().is_err());
}

#[tokio::test]
async fn test_webhook_with_closed_queue_is_unavailable() {
    let TestApp { app, events, .. } = test_app(None, false).await;
    drop(events);

    let (status, _) = send(
        &app,
        webhook(
            json!({ "event": "entry.update", "model": "product", "entry": { "id": 42 } }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_search_with_invalid_parameter_is_bad_request() {
    let test = test_app(None, false).await;

    let (status, body) = send(&test.app, get("/products/search?minPrice=100&maxPrice=10")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(test.index.searches().await.is_empty());
}

#[tokio::test]
async fn test_search_rejects_unusable_paging_and_prices() {
    let test = test_app(None, false).await;

    for uri in [
        "/products/search?page=1000&pageSize=20",
        "/products/search?page=18446744073709551615&pageSize=100",
        "/products/search?minPrice=NaN&maxPrice=5",
        "/products/aggregations?maxPrice=inf",
    ] {
        let (status, body) = send(&test.app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["status"], "error");
    }
    assert!(test.index.searches().await.is_empty());
}

#[tokio::test]
async fn test_search_in_unknown_category_is_empty() {
    let test = test_app(None, false).await;

    let (status, body) = send(&test.app, get("/products/search?category=nonexistent")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["hits"], json!([]));
    assert!(test.index.searches().await.is_empty());
}

#[tokio::test]
async fn test_search_with_aggregations() {
    let test = test_app(None, false).await;

    let (status, body) = send(
        &test.app,
        get("/products/search?category=rifles&withAggregations=true&page=2&pageSize=5"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 2);
    assert_eq!(body["pageSize"], 5);
    assert!(body["aggregations"].is_object());
    assert_eq!(test.index.searches().await.len(), 2);
}

#[tokio::test]
async fn test_search_engine_outage_is_unavailable() {
    let test = test_app(None, false).await;
    test.index.fail_searches().await;

    let (status, body) = send(&test.app, get("/products/aggregations?q=sling")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_rates_unconfigured_is_unavailable() {
    let test = test_app(None, false).await;

    let (status, _) = send(&test.app, get("/rates")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_rates_and_conversion() {
    let test = test_app(None, true).await;

    let (status, body) = send(&test.app, get("/rates")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"], "EUR");
    assert_eq!(body["rates"]["USD"], 2.0);

    let (status, body) = send(&test.app, get("/rates/convert?amount=10&from=USD&to=UAH")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], 200.0);

    let (status, _) = send(&test.app, get("/rates/convert?amount=10&from=USD&to=GBP")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
