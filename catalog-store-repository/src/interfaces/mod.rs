//! Interface definitions for the catalog store repository.
//! Re-exports the `PrimaryStore` trait consumed by the search sync pipeline.
mod primary_store;

pub use primary_store::PrimaryStore;
