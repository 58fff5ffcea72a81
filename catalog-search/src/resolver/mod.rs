//! Category closure resolver.
//!
//! Expands a category slug into the category id plus the ids of every
//! descendant, for scoping a search to a whole subtree.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use catalog_store_repository::{PrimaryStore, StoreError};
use tracing::{debug, instrument, warn};

pub struct CategoryClosureResolver {
    store: Arc<dyn PrimaryStore>,
}

impl CategoryClosureResolver {
    pub fn new(store: Arc<dyn PrimaryStore>) -> Self {
        Self { store }
    }

    /// Resolve `slug` to `[self, ...descendants]`.
    ///
    /// Returns an empty list when no category has that slug, which is
    /// distinct from a leaf category (a list holding only its own id).
    /// Children are fetched one parent at a time, breadth first; an id that
    /// was already visited is not expanded again, so cyclic parent links
    /// yield each id once.
    #[instrument(skip(self))]
    pub async fn resolve(&self, slug: &str) -> Result<Vec<i64>, StoreError> {
        let Some(root) = self.store.find_category_by_slug(slug).await? else {
            debug!(slug = %slug, "Category not found");
            return Ok(Vec::new());
        };

        let mut closure = vec![root.id];
        let mut visited = HashSet::from([root.id]);
        let mut queue = VecDeque::from([root.id]);

        while let Some(parent_id) = queue.pop_front() {
            for child in self.store.find_child_categories(parent_id).await? {
                if visited.insert(child.id) {
                    closure.push(child.id);
                    queue.push_back(child.id);
                } else {
                    warn!(
                        category_id = child.id,
                        parent_id = parent_id,
                        "Category reached twice, skipping"
                    );
                }
            }
        }

        debug!(slug = %slug, size = closure.len(), "Resolved category closure");
        Ok(closure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use catalog_search_shared::{Category, PopulatedProduct};
    use catalog_store_repository::PopulateProfile;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TreeStore {
        categories: Vec<Category>,
        child_queries: AtomicUsize,
        fail: bool,
    }

    impl TreeStore {
        fn new(edges: &[(i64, &str, Option<i64>)]) -> Self {
            let categories = edges
                .iter()
                .map(|(id, slug, parent_id)| Category {
                    id: *id,
                    name: slug.to_uppercase(),
                    slug: slug.to_string(),
                    description: None,
                    parent_id: *parent_id,
                })
                .collect();
            Self {
                categories,
                child_queries: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl PrimaryStore for TreeStore {
        async fn find_product_by_id(
            &self,
            _id: i64,
            _profile: PopulateProfile,
        ) -> Result<Option<PopulatedProduct>, StoreError> {
            Ok(None)
        }

        async fn find_all_products(
            &self,
            _profile: PopulateProfile,
        ) -> Result<Vec<PopulatedProduct>, StoreError> {
            Ok(Vec::new())
        }

        async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
            if self.fail {
                return Err(StoreError::data("connection reset"));
            }
            Ok(self.categories.iter().find(|c| c.slug == slug).cloned())
        }

        async fn find_child_categories(&self, parent_id: i64) -> Result<Vec<Category>, StoreError> {
            self.child_queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .categories
                .iter()
                .filter(|c| c.parent_id == Some(parent_id))
                .cloned()
                .collect())
        }
    }

    fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
        ids.sort_unstable();
        ids
    }

    fn chain() -> TreeStore {
        TreeStore::new(&[
            (1, "root", None),
            (2, "a", Some(1)),
            (3, "b", Some(2)),
            (4, "c", Some(3)),
        ])
    }

    #[tokio::test]
    async fn test_closure_of_inner_node() {
        let resolver = CategoryClosureResolver::new(Arc::new(chain()));
        assert_eq!(sorted(resolver.resolve("a").await.unwrap()), vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_closure_of_leaf_is_self() {
        let resolver = CategoryClosureResolver::new(Arc::new(chain()));
        assert_eq!(resolver.resolve("c").await.unwrap(), vec![4]);
    }

    #[tokio::test]
    async fn test_closure_of_unknown_slug_is_empty() {
        let store = Arc::new(chain());
        let resolver = CategoryClosureResolver::new(store.clone());

        assert!(resolver.resolve("nonexistent").await.unwrap().is_empty());
        assert_eq!(store.child_queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_closure_with_siblings() {
        let store = TreeStore::new(&[
            (1, "weapons", None),
            (2, "rifles", Some(1)),
            (3, "pistols", Some(1)),
            (4, "sniper", Some(2)),
        ]);
        let resolver = CategoryClosureResolver::new(Arc::new(store));

        assert_eq!(sorted(resolver.resolve("weapons").await.unwrap()), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_closure_terminates_on_cycle() {
        // a -> b -> a
        let store = TreeStore::new(&[(1, "a", Some(2)), (2, "b", Some(1))]);
        let resolver = CategoryClosureResolver::new(Arc::new(store));

        assert_eq!(sorted(resolver.resolve("a").await.unwrap()), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = chain();
        store.fail = true;
        let resolver = CategoryClosureResolver::new(Arc::new(store));

        assert!(resolver.resolve("a").await.is_err());
    }
}
