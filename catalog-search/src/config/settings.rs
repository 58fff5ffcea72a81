//! Typed settings read from environment variables.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use catalog_search_repository::config::DEFAULT_BATCH_SIZE;
use catalog_search_repository::{RebuildMode, SearchIndexServiceConfig};
use tracing::warn;

use crate::IndexingError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

const DEFAULT_INDEX_ALIAS: &str = "products";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

const DEFAULT_BULK_MAX_RETRIES: u32 = 2;
const DEFAULT_INDEX_REPLICAS: u32 = 1;
const DEFAULT_RATES_TTL_SECS: u64 = 3600;
const DEFAULT_EVENT_CHANNEL_SIZE: usize = 1000;
const DEFAULT_FIXER_BASE_URL: &str = "http://data.fixer.io/api";

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry the connection at a fixed interval until it succeeds.
    Retry,
}

impl ConnectionMode {
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    fn parse(raw: Option<String>) -> Self {
        match raw.unwrap_or_else(|| "retry".to_string()).to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Everything the service and the reindex job read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub opensearch_url: String,
    pub index_alias: String,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub database_url: String,
    pub batch_size: usize,
    pub bulk_max_retries: u32,
    pub index_replicas: u32,
    pub rebuild_mode: RebuildMode,
    pub version_fencing: bool,
    pub sync_failure_webhook_url: Option<String>,
    pub fixer_api_key: Option<String>,
    pub fixer_base_url: String,
    pub rates_ttl: Duration,
    pub http_addr: SocketAddr,
    pub webhook_token: Option<String>,
    pub event_channel_size: usize,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `INDEX_ALIAS`: Index or alias name (default: "products")
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `DATABASE_URL`: PostgreSQL URL of the primary store (required)
    /// - `BULK_BATCH_SIZE`: Documents per bulk request (default: 1000, must be > 0)
    /// - `BULK_MAX_RETRIES`: Retries of a failed bulk request (default: 2)
    /// - `INDEX_REPLICAS`: Replica count after a rebuild (default: 1)
    /// - `REINDEX_MODE`: "recreate" or "alias-swap" (default: recreate)
    /// - `VERSION_FENCING`: Reject stale upserts (default: false)
    /// - `SYNC_FAILURE_WEBHOOK_URL`: Where failed syncs are reported (default: log only)
    /// - `FIXER_API_KEY`, `FIXER_BASE_URL`: Currency rate source
    /// - `RATES_TTL_SECS`: Currency rate cache TTL (default: 3600)
    /// - `HTTP_ADDR`: Listen address (default: 0.0.0.0:8080)
    /// - `WEBHOOK_TOKEN`: Bearer token required on webhook calls
    /// - `EVENT_CHANNEL_SIZE`: Product event queue capacity (default: 1000)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the raw value of a key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| IndexingError::config("DATABASE_URL is not set"))?;

        let batch_size = parse_or(get("BULK_BATCH_SIZE"), "BULK_BATCH_SIZE", DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(IndexingError::config("BULK_BATCH_SIZE must be greater than zero"));
        }

        let http_addr = parse_or(
            get("HTTP_ADDR"),
            "HTTP_ADDR",
            SocketAddr::from(([0, 0, 0, 0], 8080)),
        );

        Ok(Self {
            opensearch_url: get("OPENSEARCH_URL")
                .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            index_alias: get("INDEX_ALIAS").unwrap_or_else(|| DEFAULT_INDEX_ALIAS.to_string()),
            connection_mode: ConnectionMode::parse(get("OPENSEARCH_CONNECTION_MODE")),
            retry_interval: Duration::from_secs(parse_or(
                get("OPENSEARCH_RETRY_INTERVAL_SECS"),
                "OPENSEARCH_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )),
            database_url,
            batch_size,
            bulk_max_retries: parse_or(
                get("BULK_MAX_RETRIES"),
                "BULK_MAX_RETRIES",
                DEFAULT_BULK_MAX_RETRIES,
            ),
            index_replicas: parse_or(get("INDEX_REPLICAS"), "INDEX_REPLICAS", DEFAULT_INDEX_REPLICAS),
            rebuild_mode: parse_or(get("REINDEX_MODE"), "REINDEX_MODE", RebuildMode::default()),
            version_fencing: parse_or(get("VERSION_FENCING"), "VERSION_FENCING", false),
            sync_failure_webhook_url: get("SYNC_FAILURE_WEBHOOK_URL"),
            fixer_api_key: get("FIXER_API_KEY"),
            fixer_base_url: get("FIXER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FIXER_BASE_URL.to_string()),
            rates_ttl: Duration::from_secs(parse_or(
                get("RATES_TTL_SECS"),
                "RATES_TTL_SECS",
                DEFAULT_RATES_TTL_SECS,
            )),
            http_addr,
            webhook_token: get("WEBHOOK_TOKEN"),
            event_channel_size: parse_or(
                get("EVENT_CHANNEL_SIZE"),
                "EVENT_CHANNEL_SIZE",
                DEFAULT_EVENT_CHANNEL_SIZE,
            )
            .max(1),
        })
    }

    /// Index service settings derived from these settings.
    pub fn index_service_config(&self) -> SearchIndexServiceConfig {
        SearchIndexServiceConfig {
            batch_size: self.batch_size,
            max_batch_retries: self.bulk_max_retries,
            replicas: self.index_replicas,
            rebuild_mode: self.rebuild_mode,
            ..SearchIndexServiceConfig::default()
        }
    }
}

/// Parse `raw`, falling back to `default` with a warning when it is unset
/// or invalid.
fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match raw {
        None => default,
        Some(value) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(key = key, value = %value, default = ?default, "Invalid setting, using default");
                default
            }
        },
    }
}
