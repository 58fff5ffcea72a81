//! # Catalog Search Shared
//!
//! This crate defines shared data structures used across the catalog search
//! ecosystem: the primary-store records the indexer reads, the denormalized
//! search document it writes, the typed query intents and their results, and
//! the product lifecycle events that drive synchronization.

pub mod types;

pub use types::catalog::{
    Category, CategoryRef, MediaFile, PopulatedProduct, Seller, SellerMetadata, Tag,
};
pub use types::events::ProductEvent;
pub use types::search_document::{
    CategorySummary, DocumentCategory, DocumentImage, DocumentSeller, DocumentTag,
    HierarchyEntry, SearchDocument,
};
pub use types::search_query::{
    price_field_for, AggregationIntent, Currency, PriceRange, SearchFilters, SearchIntent,
    SortDirection, SortField, SortSpec, DEFAULT_PAGE_SIZE, LEGACY_PRICE_FIELD, MAX_PAGE_SIZE,
    MAX_RESULT_WINDOW,
};
pub use types::search_result::{AggregationResponse, FacetBucket, PriceStats, SearchPage};
