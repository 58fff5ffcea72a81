//! # Catalog Search Repository
//!
//! This crate provides the write and read sides of the product search index:
//! the `SearchIndexProvider` trait and its OpenSearch implementation, the
//! index mapping, the pure query/aggregation translator, and the
//! `SearchIndexService` that owns batching, retries and index rebuilds.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod query;
pub mod service;
pub mod types;

pub use config::{RebuildMode, SearchIndexServiceConfig};
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::{IndexConfig, OpenSearchProvider};
pub use query::{build_aggregation_query, build_search_query, CategoryScope};
pub use service::SearchIndexService;
pub use types::{BatchOperationResult, BatchOperationSummary, RebuildReport};
