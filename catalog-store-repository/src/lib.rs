//! # Catalog Store Repository
//! This crate provides read access to the catalog's primary store: products
//! with their relations, and the category tree. It includes definitions for
//! errors, the `PrimaryStore` interface, the finite set of populate profiles,
//! and a concrete implementation for PostgreSQL.
pub mod errors;
pub mod interfaces;
pub mod postgres;
pub mod profile;

pub use errors::StoreError;
pub use interfaces::PrimaryStore;
pub use postgres::PostgresPrimaryStore;
pub use profile::PopulateProfile;
