//! Currency rates with an explicitly owned TTL cache.
//!
//! Prices are indexed per currency and never converted at write time; rates
//! are only used to show conversions to clients.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use catalog_search_shared::Currency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::errors::RateError;

/// Default lifetime of cached rates.
pub const DEFAULT_RATES_TTL: Duration = Duration::from_secs(3600);

/// Exchange rates relative to `base`: one unit of `base` buys `rates[c]` of `c`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRates {
    pub base: Currency,
    pub rates: BTreeMap<Currency, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl CurrencyRates {
    pub fn rate(&self, currency: Currency) -> Result<f64, RateError> {
        if currency == self.base {
            return Ok(1.0);
        }
        self.rates
            .get(&currency)
            .copied()
            .filter(|rate| *rate > 0.0)
            .ok_or_else(|| RateError::MissingRate(currency.code().to_string()))
    }

    /// Convert `amount` through the base currency.
    pub fn convert(&self, amount: f64, from: Currency, to: Currency) -> Result<f64, RateError> {
        if from == to {
            return Ok(amount);
        }
        Ok(amount / self.rate(from)? * self.rate(to)?)
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<CurrencyRates, RateError>;
}

#[derive(Debug, Deserialize)]
struct FixerResponse {
    success: bool,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(default)]
    error: Option<FixerError>,
}

#[derive(Debug, Deserialize)]
struct FixerError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    info: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Rates from the Fixer `latest` endpoint.
pub struct FixerRateSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FixerRateSource {
    pub const DEFAULT_BASE_URL: &'static str = "http://data.fixer.io/api";

    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, RateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RateError::unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl RateSource for FixerRateSource {
    async fn fetch_rates(&self) -> Result<CurrencyRates, RateError> {
        let symbols = Currency::ALL
            .iter()
            .map(Currency::code)
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .client
            .get(format!("{}/latest", self.base_url))
            .query(&[("access_key", self.api_key.as_str()), ("symbols", symbols.as_str())])
            .send()
            .await
            .map_err(|e| RateError::unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::unavailable(format!("rate source returned {}", status)));
        }

        let body: FixerResponse = response
            .json()
            .await
            .map_err(|e| RateError::parse(e.to_string()))?;

        if !body.success {
            let detail = body
                .error
                .map(|e| {
                    format!(
                        "{} ({})",
                        e.info.or(e.kind).unwrap_or_else(|| "unknown error".to_string()),
                        e.code.unwrap_or_default()
                    )
                })
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(RateError::unavailable(detail));
        }

        let base = body
            .base
            .as_deref()
            .unwrap_or("EUR")
            .parse::<Currency>()
            .map_err(RateError::parse)?;

        let rates = body
            .rates
            .iter()
            .filter_map(|(code, rate)| code.parse::<Currency>().ok().map(|c| (c, *rate)))
            .collect();

        Ok(CurrencyRates {
            base,
            rates,
            fetched_at: Utc::now(),
        })
    }
}

/// Rates cached for a fixed TTL.
///
/// Created once at startup and shared by `Arc`. Reads past the TTL fetch
/// fresh rates; `refresh` fetches unconditionally and `invalidate` drops
/// the cached value.
pub struct CurrencyRateCache {
    source: Arc<dyn RateSource>,
    ttl: Duration,
    cached: RwLock<Option<(Instant, CurrencyRates)>>,
}

impl CurrencyRateCache {
    pub fn new(source: Arc<dyn RateSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Current rates, fetched when the cache is empty or stale.
    pub async fn rates(&self) -> Result<CurrencyRates, RateError> {
        {
            let cached = self.cached.read().await;
            if let Some((stored_at, rates)) = cached.as_ref() {
                if stored_at.elapsed() < self.ttl {
                    return Ok(rates.clone());
                }
                debug!("Cached currency rates expired");
            }
        }
        self.refresh().await
    }

    /// Fetch rates now and replace the cached value.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<CurrencyRates, RateError> {
        let rates = self.source.fetch_rates().await?;
        *self.cached.write().await = Some((Instant::now(), rates.clone()));

        info!(base = %rates.base, currencies = rates.rates.len(), "Currency rates refreshed");
        Ok(rates)
    }

    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    pub async fn convert(&self, amount: f64, from: Currency, to: Currency) -> Result<f64, RateError> {
        self.rates().await?.convert(amount, from, to)
    }
}
