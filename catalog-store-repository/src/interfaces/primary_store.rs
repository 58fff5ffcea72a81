use catalog_search_shared::{Category, PopulatedProduct};

use crate::errors::StoreError;
use crate::profile::PopulateProfile;

/// Trait for reading the authoritative catalog.
///
/// This trait provides a clean abstraction over the underlying data store for
/// the search sync pipeline. It is read-only: the pipeline never writes back.
#[async_trait::async_trait]
pub trait PrimaryStore: Send + Sync {
    /// Load one product with the relations named by `profile`.
    async fn find_product_by_id(
        &self,
        id: i64,
        profile: PopulateProfile,
    ) -> Result<Option<PopulatedProduct>, StoreError>;

    /// Load the whole catalog. Implementations may page internally.
    async fn find_all_products(
        &self,
        profile: PopulateProfile,
    ) -> Result<Vec<PopulatedProduct>, StoreError>;

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError>;

    /// Direct children of a category, one level down.
    async fn find_child_categories(&self, parent_id: i64) -> Result<Vec<Category>, StoreError>;
}
