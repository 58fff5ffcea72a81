//! Error types for the catalog search service.

use catalog_search_repository::SearchIndexError;
use catalog_store_repository::StoreError;
use thiserror::Error;

/// Errors on the indexing side: loading a product and writing its document.
///
/// These never reach the caller of a sync; the orchestrator logs them,
/// notifies, and reports a failed outcome instead.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Failed to read from the primary store.
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// Failed to write to the search index.
    #[error("Index error: {0}")]
    IndexError(#[from] SearchIndexError),
}

/// Errors on the query side. These propagate to the caller.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The category closure could not be computed.
    #[error("Category resolution failed: {0}")]
    CategoryResolution(String),

    /// The search engine rejected or failed the request.
    #[error("Search engine error: {0}")]
    Engine(#[from] SearchIndexError),

    /// A query parameter could not be parsed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl QueryError {
    pub fn category_resolution(msg: impl Into<String>) -> Self {
        Self::CategoryResolution(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// True when the failure means a backend is unreachable rather than the
    /// request being wrong.
    pub fn is_unavailable(&self) -> bool {
        match self {
            QueryError::CategoryResolution(_) => true,
            QueryError::Engine(e) => e.is_unavailable(),
            QueryError::InvalidQuery(_) => false,
        }
    }
}

/// Errors delivering a failure notification.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification transport error: {0}")]
    TransportError(String),

    #[error("Notification rejected with status {0}")]
    Rejected(u16),
}

impl NotifyError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }
}

/// Errors fetching or applying currency rates.
#[derive(Error, Debug)]
pub enum RateError {
    /// The rate source could not be reached or answered with an error.
    #[error("Rate source error: {0}")]
    SourceError(String),

    /// The rate source answered with something we could not read.
    #[error("Rate parse error: {0}")]
    ParseError(String),

    /// No rate is known for the currency.
    #[error("No rate for currency {0}")]
    MissingRate(String),
}

impl RateError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::SourceError(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
