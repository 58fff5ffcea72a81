//! Query facade used by the HTTP surface.
//!
//! Resolves the category scope of a request, short-circuits scopes that
//! matched no category, and runs the translated query against the index.

use std::sync::Arc;

use catalog_search_repository::{CategoryScope, SearchIndexService};
use catalog_search_shared::{
    AggregationIntent, AggregationResponse, SearchFilters, SearchIntent, SearchPage,
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::errors::QueryError;
use crate::resolver::CategoryClosureResolver;

/// A search page together with the facets of the same filter set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchWithAggregations {
    #[serde(flatten)]
    pub page: SearchPage,
    pub aggregations: AggregationResponse,
}

pub struct CatalogSearch {
    index: Arc<SearchIndexService>,
    resolver: CategoryClosureResolver,
}

impl CatalogSearch {
    pub fn new(index: Arc<SearchIndexService>, resolver: CategoryClosureResolver) -> Self {
        Self { index, resolver }
    }

    /// One page of hits for `intent`.
    ///
    /// A category slug that matches no category yields an empty page; no
    /// query is sent to the engine in that case.
    #[instrument(skip(self, intent))]
    pub async fn search(&self, intent: &SearchIntent) -> Result<SearchPage, QueryError> {
        let scope = self.resolve_scope(&intent.filters).await?;
        self.search_in_scope(intent, &scope).await
    }

    /// Facet counts and per-currency price statistics for `intent`.
    #[instrument(skip(self, intent))]
    pub async fn aggregate(
        &self,
        intent: &AggregationIntent,
    ) -> Result<AggregationResponse, QueryError> {
        let scope = self.resolve_scope(&intent.filters).await?;
        self.aggregate_in_scope(intent, &scope).await
    }

    /// Search and aggregate over one filter set, resolving the category
    /// closure once for both requests.
    #[instrument(skip(self, intent))]
    pub async fn search_with_aggregations(
        &self,
        intent: &SearchIntent,
    ) -> Result<SearchWithAggregations, QueryError> {
        let scope = self.resolve_scope(&intent.filters).await?;
        let aggregation_intent = AggregationIntent::from(intent);

        let (page, aggregations) = tokio::try_join!(
            self.search_in_scope(intent, &scope),
            self.aggregate_in_scope(&aggregation_intent, &scope),
        )?;

        Ok(SearchWithAggregations { page, aggregations })
    }

    async fn resolve_scope(&self, filters: &SearchFilters) -> Result<CategoryScope, QueryError> {
        let Some(slug) = filters.closure_slug() else {
            return Ok(CategoryScope::Unscoped);
        };

        let ids = self
            .resolver
            .resolve(slug)
            .await
            .map_err(|e| QueryError::category_resolution(e.to_string()))?;

        Ok(CategoryScope::Closure(ids))
    }

    async fn search_in_scope(
        &self,
        intent: &SearchIntent,
        scope: &CategoryScope,
    ) -> Result<SearchPage, QueryError> {
        if scope.is_empty_closure() {
            debug!("Category scope is empty, returning empty page");
            return Ok(SearchPage::empty(
                intent.effective_page(),
                intent.effective_page_size(),
            ));
        }

        Ok(self.index.search(intent, scope).await?)
    }

    async fn aggregate_in_scope(
        &self,
        intent: &AggregationIntent,
        scope: &CategoryScope,
    ) -> Result<AggregationResponse, QueryError> {
        if scope.is_empty_closure() {
            debug!("Category scope is empty, returning empty aggregations");
            return Ok(AggregationResponse::empty());
        }

        Ok(self.index.aggregate(intent, scope).await?)
    }
}
