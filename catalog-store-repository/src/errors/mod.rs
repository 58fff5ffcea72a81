//! Error types for the catalog store repository.
//! Consolidates and re-exports error types related to primary store reads.
mod store;

pub use store::StoreError;
