//! Result types for bulk operations and index rebuilds.

use catalog_search_shared::SearchDocument;

use crate::config::RebuildMode;
use crate::errors::SearchIndexError;

/// Result of a bulk operation for a single document.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The product id the document belongs to.
    pub product_id: i64,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

impl BatchOperationResult {
    pub fn succeeded(product_id: i64) -> Self {
        Self {
            product_id,
            success: true,
            error: None,
        }
    }

    pub fn failed(product_id: i64, error: SearchIndexError) -> Self {
        Self {
            product_id,
            success: false,
            error: Some(error),
        }
    }
}

/// Summary of a bulk operation containing aggregate statistics and individual results.
///
/// A summary with `failed > 0` and `succeeded > 0` is a partial failure: the
/// failing documents are listed individually and their siblings are unaffected.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of documents attempted.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each document.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Build a summary from per-document results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Mark every document of a batch as failed with the same error.
    pub fn all_failed(documents: &[SearchDocument], error: &SearchIndexError) -> Self {
        Self::from_results(
            documents
                .iter()
                .map(|doc| BatchOperationResult::failed(doc.id, error.clone()))
                .collect(),
        )
    }

    /// Fold another batch's results into this summary.
    pub fn merge(&mut self, other: BatchOperationSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.results.extend(other.results);
    }

    /// True when some but not all documents failed.
    pub fn is_partial_failure(&self) -> bool {
        self.failed > 0 && self.succeeded > 0
    }

    /// Ids of the documents that failed.
    pub fn failed_ids(&self) -> Vec<i64> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.product_id)
            .collect()
    }
}

/// Outcome of a full index rebuild.
#[derive(Debug, Clone)]
pub struct RebuildReport {
    pub mode: RebuildMode,
    /// The concrete index the documents were written into.
    pub index: String,
    /// Number of bulk batches submitted.
    pub batches: usize,
    pub summary: BatchOperationSummary,
    /// Indices the alias pointed to before the swap (alias-swap mode only).
    pub replaced_indices: Vec<String>,
}
