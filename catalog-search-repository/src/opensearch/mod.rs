//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, plus the index definition it creates.

mod bulk;
mod index_config;
mod provider;

pub use bulk::{build_bulk_body, parse_bulk_response};
pub use index_config::{
    finalized_settings, get_bulk_load_index_definition, get_index_definition,
    get_index_mappings, get_live_index_definition, get_versioned_index_name, IndexConfig,
};
pub use provider::OpenSearchProvider;
