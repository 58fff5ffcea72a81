mod primary_store;
mod rows;

pub use primary_store::PostgresPrimaryStore;
