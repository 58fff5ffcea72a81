//! This module defines the core data structures used across the catalog search index.
//! It re-exports the primary-store records, the search document, query intents,
//! results and lifecycle events.

pub mod catalog;
pub mod events;
pub mod search_document;
pub mod search_query;
pub mod search_result;
