// HTTP request handlers
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use catalog_search_shared::{AggregationIntent, Currency, ProductEvent};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::errors::{QueryError, RateError};
use crate::server::params::{parse_filters, parse_search_intent, Params};
use crate::server::state::AppState;

const PRODUCT_MODEL: &str = "product";
const PRODUCT_UID: &str = "api::product.product";

/// Errors returned to HTTP clients as `{status: "error", message}`.
#[derive(Debug)]
pub enum ApiError {
    Query(QueryError),
    Rates(RateError),
    Unauthorized,
    Unavailable(String),
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self::Query(err)
    }
}

impl From<RateError> for ApiError {
    fn from(err: RateError) -> Self {
        Self::Rates(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Query(err) => {
                let status = if err.is_unavailable() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else if matches!(err, QueryError::InvalidQuery(_)) {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, err.to_string())
            }
            ApiError::Rates(err) => {
                let status = match err {
                    RateError::SourceError(_) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid webhook token".to_string()),
            ApiError::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "Request failed");
        }

        (
            status,
            Json(json!({
                "status": "error",
                "message": message
            })),
        )
            .into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Product search. `withAggregations=true` adds the facets of the same
/// filter set to the response.
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Response, ApiError> {
    let intent = parse_search_intent(&params)?;
    let with_aggregations = params
        .get("withAggregations")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    if with_aggregations {
        let result = state.search.search_with_aggregations(&intent).await?;
        return Ok(Json(result).into_response());
    }

    let page = state.search.search(&intent).await?;
    Ok(Json(page).into_response())
}

pub async fn product_aggregations(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Response, ApiError> {
    let intent = AggregationIntent::new(parse_filters(&params)?);
    let aggregations = state.search.aggregate(&intent).await?;
    Ok(Json(aggregations).into_response())
}

fn rate_cache(state: &AppState) -> Result<&crate::rates::CurrencyRateCache, ApiError> {
    state
        .rates
        .as_deref()
        .ok_or_else(|| ApiError::Unavailable("Currency rates are not configured".to_string()))
}

/// Current rates. `refresh=true` bypasses the cache.
pub async fn currency_rates(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Response, ApiError> {
    let cache = rate_cache(&state)?;
    let refresh = params
        .get("refresh")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    let rates = if refresh {
        cache.refresh().await?
    } else {
        cache.rates().await?
    };
    Ok(Json(rates).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ConvertParams {
    amount: f64,
    from: String,
    to: String,
}

pub async fn convert_currency(
    State(state): State<AppState>,
    Query(params): Query<ConvertParams>,
) -> Result<Response, ApiError> {
    let cache = rate_cache(&state)?;
    let from = params
        .from
        .parse::<Currency>()
        .map_err(QueryError::invalid_query)?;
    let to = params
        .to
        .parse::<Currency>()
        .map_err(QueryError::invalid_query)?;

    let result = cache.convert(params.amount, from, to).await?;
    Ok(Json(json!({
        "amount": params.amount,
        "from": from,
        "to": to,
        "result": result
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct StrapiWebhook {
    pub event: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub entry: Option<StrapiEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StrapiEntry {
    pub id: i64,
}

impl StrapiWebhook {
    fn is_product(&self) -> bool {
        self.model.as_deref() == Some(PRODUCT_MODEL) || self.uid.as_deref() == Some(PRODUCT_UID)
    }

    /// The product event this webhook describes, if any.
    pub fn to_product_event(&self) -> Option<ProductEvent> {
        if !self.is_product() {
            return None;
        }
        let product_id = self.entry.as_ref()?.id;

        match self.event.as_str() {
            "entry.create" => Some(ProductEvent::Created { product_id }),
            "entry.update" | "entry.publish" | "entry.unpublish" => {
                Some(ProductEvent::Updated { product_id })
            }
            "entry.delete" => Some(ProductEvent::Deleted { product_id }),
            _ => None,
        }
    }
}

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(expected) = state.webhook_token.as_deref() else {
        return true;
    };

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token.trim() == expected)
}

/// Strapi webhook intake. Product events are queued for the orchestrator
/// and acknowledged without waiting for indexing.
pub async fn strapi_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<StrapiWebhook>,
) -> Result<Response, ApiError> {
    if !authorized(&state, &headers) {
        warn!(event = %payload.event, "Rejected webhook with invalid token");
        return Err(ApiError::Unauthorized);
    }

    let Some(event) = payload.to_product_event() else {
        debug!(event = %payload.event, model = ?payload.model, "Ignoring webhook");
        return Ok((StatusCode::ACCEPTED, Json(json!({ "status": "ignored" }))).into_response());
    };

    if let Err(e) = state.event_sender.send(event).await {
        error!(product_id = event.product_id(), error = %e, "Failed to queue product event");
        return Err(ApiError::Unavailable("Product event queue is closed".to_string()));
    }

    info!(product_id = event.product_id(), event = %payload.event, "Queued product event");
    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "queued" }))).into_response())
}
