//! Search index error types.
//!
//! This module defines the unified error type for all search index operations,
//! on both the write side (upserts, deletes, bulk loads, index lifecycle) and
//! the read side (search and aggregation requests).

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait and `SearchIndexService`. A delete
/// of an absent document is not an error and has no variant here.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., a zero batch size).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to write a single document.
    #[error("Index write error: {0}")]
    IndexWriteError(String),

    /// A bulk request failed as a whole.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to delete a document.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Failed to create, drop or check an index.
    #[error("Index lifecycle error: {0}")]
    IndexLifecycleError(String),

    /// Failed to update index settings or refresh an index.
    #[error("Index settings error: {0}")]
    SettingsError(String),

    /// Failed to repoint the index alias.
    #[error("Alias error: {0}")]
    AliasError(String),

    /// A search or aggregation request was rejected by the engine.
    #[error("Search error: {0}")]
    SearchError(String),

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a single-document write error.
    pub fn index_write(msg: impl Into<String>) -> Self {
        Self::IndexWriteError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create a delete error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    /// Create an index lifecycle error.
    pub fn index_lifecycle(msg: impl Into<String>) -> Self {
        Self::IndexLifecycleError(msg.into())
    }

    /// Create a settings error.
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::SettingsError(msg.into())
    }

    /// Create an alias error.
    pub fn alias(msg: impl Into<String>) -> Self {
        Self::AliasError(msg.into())
    }

    /// Create a search error.
    pub fn search(msg: impl Into<String>) -> Self {
        Self::SearchError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// True when the engine could not be reached or refused the request,
    /// as opposed to a local validation or parsing problem.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ConnectionError(_) | Self::SearchError(_))
    }
}
