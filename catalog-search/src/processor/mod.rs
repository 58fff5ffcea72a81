//! Processor module for the catalog search service.
//!
//! Transforms populated products into search documents.

mod product_mapper;

pub use product_mapper::{map_product_to_document, ProductMapper};
